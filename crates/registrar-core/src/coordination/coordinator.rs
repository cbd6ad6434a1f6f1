//! Enrollment coordinator.
//!
//! Runs enroll and cancel as read-validate-write sequences serialized per
//! offering. All mutations of one offering's enrollment count happen while
//! that offering's lock is held, so the count cannot lose an update or
//! overshoot capacity. Different offerings proceed in parallel.
//!
//! # Partial failure
//!
//! The store has no transaction spanning calls. If writing the enrollment
//! row succeeds and updating the count then fails, the error is returned
//! as-is and the row stays. The offering then needs
//! [`EnrollmentCoordinator::reconcile`], which recounts the rows and stores
//! the result.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::locks::LockRegistry;
use crate::{
    domain::{CourseOffering, NewEnrollment, OfferingId, StudentId},
    error::{Error, Result},
    response::{EnrollmentResponse, OfferingResponse, ReconcileResponse},
    store::Stores,
};

/// Credit load a student may carry across all enrollments.
pub const MAX_CREDITS_PER_STUDENT: u32 = 18;

/// Tunable enrollment rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentPolicy {
    /// Highest allowed credit total, inclusive
    pub max_credits: u32,
}

impl Default for EnrollmentPolicy {
    fn default() -> Self {
        Self {
            max_credits: MAX_CREDITS_PER_STUDENT,
        }
    }
}

/// Serializes enroll/cancel per offering and enforces the enrollment rules.
#[derive(Debug, Clone)]
pub struct EnrollmentCoordinator {
    stores: Stores,
    locks: Arc<LockRegistry<OfferingId>>,
    policy: EnrollmentPolicy,
}

impl EnrollmentCoordinator {
    /// Coordinator over `stores`, serializing through `locks`.
    ///
    /// Coordinators that must exclude each other have to share the same
    /// registry.
    #[must_use]
    pub const fn new(
        stores: Stores,
        locks: Arc<LockRegistry<OfferingId>>,
        policy: EnrollmentPolicy,
    ) -> Self {
        Self {
            stores,
            locks,
            policy,
        }
    }

    /// Coordinator with its own lock registry and the default policy.
    #[must_use]
    pub fn with_stores(stores: Stores) -> Self {
        Self::new(
            stores,
            Arc::new(LockRegistry::new()),
            EnrollmentPolicy::default(),
        )
    }

    /// Enroll a student in an offering.
    ///
    /// # Errors
    ///
    /// - `StudentNotFound` / `OfferingNotFound`
    /// - `CapacityExceeded` when the offering is full
    /// - `TimeConflict` naming the first held offering that overlaps
    /// - `CreditLimitExceeded` when the new total passes the policy limit
    /// - `Store` for any store failure; see the module docs for what a
    ///   failure after the row is written means
    pub async fn enroll(
        &self,
        student_id: StudentId,
        offering_id: OfferingId,
    ) -> Result<EnrollmentResponse> {
        let _guard = self.locks.acquire(offering_id).await;
        debug!(student = %student_id, offering = %offering_id, "enroll: lock acquired");

        let result = self.enroll_locked(student_id, offering_id).await;
        match &result {
            Ok(enrollment) => info!(
                student = %student_id,
                offering = %offering_id,
                enrollment = enrollment.id,
                "enrolled"
            ),
            Err(e) if e.is_rule_rejection() => {
                warn!(
                    student = %student_id,
                    offering = %offering_id,
                    error = %e,
                    "enroll rejected"
                );
            }
            Err(e) => {
                debug!(student = %student_id, offering = %offering_id, error = %e, "enroll failed");
            }
        }
        result
    }

    async fn enroll_locked(
        &self,
        student_id: StudentId,
        offering_id: OfferingId,
    ) -> Result<EnrollmentResponse> {
        self.require_student(student_id).await?;
        let offering = self.require_offering(offering_id).await?;

        if offering.is_full() {
            return Err(Error::CapacityExceeded {
                offering: offering_id,
                capacity: offering.capacity(),
            });
        }

        let held = self
            .stores
            .enrollments
            .list_offerings_for_student(student_id)
            .await?;
        check_schedule(&offering, &held)?;
        check_credit_limit(&offering, &held, self.policy.max_credits)?;

        let created = self
            .stores
            .enrollments
            .create_enrollment(NewEnrollment::new(student_id, offering_id))
            .await?;

        // The row exists from here on. A failure below leaves the count behind.
        self.increment_count(offering_id).await.inspect_err(|e| {
            error!(
                student = %student_id,
                offering = %offering_id,
                enrollment = %created.id,
                error = %e,
                "enrollment stored but count not updated; offering needs reconcile"
            );
        })?;

        Ok(created.into())
    }

    async fn increment_count(&self, offering_id: OfferingId) -> Result<()> {
        let current = self.require_offering(offering_id).await?;
        self.stores
            .offerings
            .update_offering_count(offering_id, current.current_enrollment() + 1)
            .await?;
        Ok(())
    }

    /// Cancel a student's enrollment in an offering.
    ///
    /// # Errors
    ///
    /// - `StudentNotFound` / `OfferingNotFound`
    /// - `NotEnrolled` when no enrollment row matched; the count is left
    ///   alone
    /// - `Store` for any store failure
    pub async fn cancel(&self, student_id: StudentId, offering_id: OfferingId) -> Result<()> {
        let _guard = self.locks.acquire(offering_id).await;
        debug!(student = %student_id, offering = %offering_id, "cancel: lock acquired");

        let result = self.cancel_locked(student_id, offering_id).await;
        match &result {
            Ok(()) => {
                info!(student = %student_id, offering = %offering_id, "enrollment cancelled");
            }
            Err(e) if e.is_rule_rejection() => {
                warn!(
                    student = %student_id,
                    offering = %offering_id,
                    error = %e,
                    "cancel rejected"
                );
            }
            Err(e) => {
                debug!(student = %student_id, offering = %offering_id, error = %e, "cancel failed");
            }
        }
        result
    }

    async fn cancel_locked(&self, student_id: StudentId, offering_id: OfferingId) -> Result<()> {
        self.require_student(student_id).await?;
        let offering = self.require_offering(offering_id).await?;

        let removed = self
            .stores
            .enrollments
            .delete_enrollment(student_id, offering_id)
            .await?;
        if !removed {
            return Err(Error::NotEnrolled {
                student: student_id,
                offering: offering_id,
            });
        }

        let next = offering.current_enrollment().saturating_sub(1);
        self.stores
            .offerings
            .update_offering_count(offering_id, next)
            .await
            .inspect_err(|e| {
                error!(
                    student = %student_id,
                    offering = %offering_id,
                    error = %e,
                    "enrollment removed but count not updated; offering needs reconcile"
                );
            })?;
        Ok(())
    }

    /// Offerings the student currently holds, ascending by offering id.
    ///
    /// Takes no lock. Concurrent enroll/cancel calls may or may not be
    /// reflected.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the listing fails.
    pub async fn list_by_student(&self, student_id: StudentId) -> Result<Vec<OfferingResponse>> {
        let offerings = self
            .stores
            .enrollments
            .list_offerings_for_student(student_id)
            .await?;
        Ok(offerings.iter().map(OfferingResponse::from).collect())
    }

    /// Recount an offering's enrollment rows and store the count.
    ///
    /// Repairs an offering left inconsistent by a partial enroll or cancel.
    ///
    /// # Errors
    ///
    /// - `OfferingNotFound`
    /// - `Store` for any store failure, including a recount that exceeds
    ///   capacity
    pub async fn reconcile(&self, offering_id: OfferingId) -> Result<ReconcileResponse> {
        let _guard = self.locks.acquire(offering_id).await;

        let offering = self.require_offering(offering_id).await?;
        let live = self
            .stores
            .enrollments
            .count_for_offering(offering_id)
            .await?;

        let response = ReconcileResponse {
            offering_id: offering_id.get(),
            previous: offering.current_enrollment(),
            current: live,
        };

        if response.changed() {
            self.stores
                .offerings
                .update_offering_count(offering_id, live)
                .await?;
            warn!(
                offering = %offering_id,
                previous = response.previous,
                current = response.current,
                "enrollment count repaired"
            );
        } else {
            debug!(offering = %offering_id, count = live, "enrollment count consistent");
        }

        Ok(response)
    }

    async fn require_student(&self, student_id: StudentId) -> Result<()> {
        self.stores
            .students
            .find_student(student_id)
            .await?
            .map(|_| ())
            .ok_or(Error::StudentNotFound(student_id))
    }

    async fn require_offering(&self, offering_id: OfferingId) -> Result<CourseOffering> {
        self.stores
            .offerings
            .find_offering(offering_id)
            .await?
            .ok_or(Error::OfferingNotFound(offering_id))
    }
}

/// Reject `candidate` if it overlaps any held offering.
///
/// # Errors
///
/// Returns `TimeConflict` naming the first overlapping offering.
pub fn check_schedule(candidate: &CourseOffering, held: &[CourseOffering]) -> Result<()> {
    held.iter()
        .find(|existing| candidate.conflicts_with(existing))
        .map_or(Ok(()), |existing| {
            Err(Error::TimeConflict {
                conflicting: existing.name().to_string(),
            })
        })
}

/// Reject `candidate` if held credits plus its own exceed `limit`.
///
/// # Errors
///
/// Returns `CreditLimitExceeded` with the would-be total.
pub fn check_credit_limit(
    candidate: &CourseOffering,
    held: &[CourseOffering],
    limit: u32,
) -> Result<()> {
    let total = held
        .iter()
        .map(CourseOffering::credit)
        .fold(candidate.credit(), u32::saturating_add);

    if total > limit {
        return Err(Error::CreditLimitExceeded { total, limit });
    }
    Ok(())
}
