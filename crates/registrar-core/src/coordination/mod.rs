//! Coordination of concurrent enrollment mutations.

pub mod coordinator;
pub mod locks;

pub use coordinator::{
    check_credit_limit, check_schedule, EnrollmentCoordinator, EnrollmentPolicy,
    MAX_CREDITS_PER_STUDENT,
};
pub use locks::{KeyGuard, LockRegistry};
