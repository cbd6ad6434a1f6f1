//! Serializable views handed to request-handling glue.

use serde::{Deserialize, Serialize};

use crate::domain::{format_time, CourseOffering, Enrollment, Student, Weekday};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: i64,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id().get(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingResponse {
    pub id: i64,
    pub name: String,
    pub capacity: u32,
    pub credit: u32,
    pub day: Weekday,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub current_enrollment: u32,
}

impl From<&CourseOffering> for OfferingResponse {
    fn from(offering: &CourseOffering) -> Self {
        Self {
            id: offering.id().get(),
            name: offering.name().to_string(),
            capacity: offering.capacity(),
            credit: offering.credit(),
            day: offering.day(),
            start_time: format_time(offering.start_time()),
            end_time: format_time(offering.end_time()),
            current_enrollment: offering.current_enrollment(),
        }
    }
}

impl From<CourseOffering> for OfferingResponse {
    fn from(offering: CourseOffering) -> Self {
        Self::from(&offering)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub id: i64,
    pub student_id: i64,
    pub offering_id: i64,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id.get(),
            student_id: enrollment.student_id.get(),
            offering_id: enrollment.offering_id.get(),
        }
    }
}

/// Outcome of recounting an offering's enrollments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub offering_id: i64,
    /// Count stored before the recount
    pub previous: u32,
    /// Live enrollment rows, now stored
    pub current: u32,
}

impl ReconcileResponse {
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.previous != self.current
    }
}
