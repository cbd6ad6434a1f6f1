//! Store contracts for persistence abstraction.
//!
//! The services depend on these traits, never on a concrete backend.
//! [`MemoryStore`] backs the tests; the CLI ships a `SQLite` implementation.
//!
//! # Contract
//!
//! - Each individual call is atomic and durable once it returns `Ok`.
//! - Nothing here spans calls. Multi-step consistency is the caller's
//!   concern (see the enrollment coordinator).
//! - Lookups return `Ok(None)` for a missing row; `Err` is reserved for the
//!   store itself failing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{CourseOffering, Enrollment, NewEnrollment, OfferingId, Student, StudentId},
    error::StoreResult,
};

mod memory;

pub use memory::MemoryStore;

/// Student persistence.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn find_student(&self, id: StudentId) -> StoreResult<Option<Student>>;

    /// # Errors
    ///
    /// Returns `Conflict` if the id is already registered.
    async fn create_student(&self, student: Student) -> StoreResult<Student>;
}

/// Course offering persistence.
#[async_trait]
pub trait OfferingStore: Send + Sync {
    async fn find_offering(&self, id: OfferingId) -> StoreResult<Option<CourseOffering>>;

    async fn find_offering_by_name(&self, name: &str) -> StoreResult<Option<CourseOffering>>;

    /// All offerings, ascending by id.
    async fn list_offerings(&self) -> StoreResult<Vec<CourseOffering>>;

    /// # Errors
    ///
    /// Returns `Conflict` if the id or name is taken.
    async fn create_offering(&self, offering: CourseOffering) -> StoreResult<CourseOffering>;

    /// Remove an offering together with its enrollments.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the offering does not exist.
    async fn delete_offering(&self, id: OfferingId) -> StoreResult<()>;

    /// Overwrite the stored enrollment count.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the offering does not exist.
    async fn update_offering_count(&self, id: OfferingId, count: u32) -> StoreResult<()>;
}

/// Enrollment persistence.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Persist an enrollment and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the pair is already enrolled.
    async fn create_enrollment(&self, enrollment: NewEnrollment) -> StoreResult<Enrollment>;

    /// Remove the enrollment for a pair. `Ok(false)` means no row matched.
    async fn delete_enrollment(&self, student: StudentId, offering: OfferingId)
        -> StoreResult<bool>;

    /// Offerings the student is enrolled in, ascending by offering id.
    async fn list_offerings_for_student(&self, student: StudentId)
        -> StoreResult<Vec<CourseOffering>>;

    /// Number of live enrollment rows for an offering.
    async fn count_for_offering(&self, offering: OfferingId) -> StoreResult<u32>;
}

/// Handles to the three stores a service needs.
#[derive(Clone)]
pub struct Stores {
    pub students: Arc<dyn StudentStore>,
    pub offerings: Arc<dyn OfferingStore>,
    pub enrollments: Arc<dyn EnrollmentStore>,
}

impl Stores {
    /// Use one backend for all three contracts.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: StudentStore + OfferingStore + EnrollmentStore + 'static,
    {
        Self {
            students: store.clone(),
            offerings: store.clone(),
            enrollments: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
