//! # Domain Layer
//!
//! Entities and value objects for course registration. Everything here is
//! pure: no I/O, no locks, no global state.
//!
//! - [`StudentId`] / [`OfferingId`] / [`EnrollmentId`] - validated identifiers
//! - [`Weekday`] / [`TimeSlot`] - weekly schedule slots with half-open overlap
//! - [`CourseOffering`] - a course section with capacity, credit and slot
//! - [`Student`] / [`NewEnrollment`] / [`Enrollment`] - the join between them
//!
//! Constructors validate once; a value that exists is valid.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod identifiers;
pub mod offering;
pub mod schedule;
pub mod student;

pub use identifiers::{EnrollmentId, OfferingId, StudentId};
pub use offering::CourseOffering;
pub use schedule::{format_time, parse_time, TimeSlot, Weekday};
pub use student::{Enrollment, NewEnrollment, Student};
