use registrar_core::{
    EnrollmentResponse, OfferingId, OfferingResponse, ReconcileResponse, StudentId,
};
use serde::Serialize;

use super::AppContext;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct CancelledEnrollment {
    pub student_id: i64,
    pub offering_id: i64,
}

/// Validate a raw student/offering pair.
pub fn parse_pair(student: i64, offering: i64) -> registrar_core::Result<(StudentId, OfferingId)> {
    Ok((StudentId::new(student)?, OfferingId::new(offering)?))
}

pub async fn enroll(ctx: &AppContext, student: i64, offering: i64) -> Result<EnrollmentResponse> {
    let (student, offering) = parse_pair(student, offering)?;
    Ok(ctx.coordinator.enroll(student, offering).await?)
}

pub async fn cancel(ctx: &AppContext, student: i64, offering: i64) -> Result<CancelledEnrollment> {
    let (student, offering) = parse_pair(student, offering)?;
    ctx.coordinator.cancel(student, offering).await?;
    Ok(CancelledEnrollment {
        student_id: student.get(),
        offering_id: offering.get(),
    })
}

pub async fn list(ctx: &AppContext, student: i64) -> Result<Vec<OfferingResponse>> {
    let student = StudentId::new(student).map_err(registrar_core::Error::from)?;
    Ok(ctx.coordinator.list_by_student(student).await?)
}

pub async fn reconcile(ctx: &AppContext, offering: i64) -> Result<ReconcileResponse> {
    let offering = OfferingId::new(offering).map_err(registrar_core::Error::from)?;
    Ok(ctx.coordinator.reconcile(offering).await?)
}
