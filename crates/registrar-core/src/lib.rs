//! Registrar-core - course enrollment coordination
//!
//! This crate provides:
//! - Domain entities with self-validating constructors
//! - Store contracts plus an in-memory implementation
//! - A per-offering lock registry
//! - The enrollment coordinator (enroll, cancel, list, reconcile)
//! - Offering and student registration services
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. Rule rejections,
//! missing rows and store failures are all variants of [`Error`]; nothing
//! panics and nothing is retried internally.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod coordination;
pub mod domain;
pub mod error;
pub mod registration;
pub mod response;
pub mod store;

pub use coordination::{EnrollmentCoordinator, EnrollmentPolicy, LockRegistry};
pub use domain::{
    CourseOffering, Enrollment, EnrollmentId, NewEnrollment, OfferingId, Student, StudentId,
    TimeSlot, Weekday,
};
pub use error::{Error, Result, StoreError, StoreResult, ValidationError};
pub use registration::{CreateOfferingRequest, OfferingService, StudentService};
pub use response::{EnrollmentResponse, OfferingResponse, ReconcileResponse, StudentResponse};
pub use store::{EnrollmentStore, MemoryStore, OfferingStore, Stores, StudentStore};
