//! Error taxonomy for registrar-core
//!
//! - **`ValidationError`**: field-level failures raised by entity constructors
//! - **`StoreError`**: failures reported by a store implementation
//! - **`Error`**: everything a service operation can fail with
//!
//! All of these are expected outcomes. Callers match on them to decide what
//! to present; nothing here is retried internally.

use thiserror::Error;

use crate::domain::{OfferingId, StudentId};

/// Field-level validation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("student id must be between {min} and {max} (got {value})")]
    StudentIdOutOfRange { value: i64, min: i64, max: i64 },

    #[error("offering id must be between {min} and {max} (got {value})")]
    OfferingIdOutOfRange { value: i64, min: i64, max: i64 },

    #[error("enrollment id must be positive (got {value})")]
    EnrollmentIdNotPositive { value: i64 },

    #[error("offering name must be {min} to {max} characters (got {actual})")]
    NameLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("capacity must be between {min} and {max} (got {value})")]
    CapacityOutOfRange { value: i64, min: i64, max: i64 },

    #[error("credit must be between {min} and {max} (got {value})")]
    CreditOutOfRange { value: i64, min: i64, max: i64 },

    #[error("day must be one of MON, TUE, WED, THU, FRI (got '{value}')")]
    InvalidDay { value: String },

    #[error("time must be formatted HH:MM (got '{value}')")]
    InvalidTime { value: String },

    #[error("end time {end} must be after start time {start}")]
    TimeOrder { start: String, end: String },

    #[error("current enrollment {value} is outside 0..={capacity}")]
    EnrollmentCountOutOfRange { value: i64, capacity: u32 },
}

/// Failure reported by a store implementation.
///
/// The coordinator never inspects these beyond passing them through as
/// [`Error::Store`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Row the operation targets does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Write would violate a uniqueness or integrity constraint
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying storage failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    #[must_use]
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} '{id}'"))
    }

    #[must_use]
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict(reason.into())
    }

    #[must_use]
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage(reason.into())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Every failure a registrar operation can surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("student {0} does not exist")]
    StudentNotFound(StudentId),

    #[error("offering {0} does not exist")]
    OfferingNotFound(OfferingId),

    #[error("offering {offering} is full ({capacity} seats)")]
    CapacityExceeded { offering: OfferingId, capacity: u32 },

    #[error("schedule overlaps with '{conflicting}'")]
    TimeConflict { conflicting: String },

    #[error("total credit {total} would exceed the limit of {limit}")]
    CreditLimitExceeded { total: u32, limit: u32 },

    #[error("student {student} is not enrolled in offering {offering}")]
    NotEnrolled {
        student: StudentId,
        offering: OfferingId,
    },

    #[error("an offering named '{0}' already exists")]
    DuplicateOfferingName(String),

    #[error("offering {0} already exists")]
    DuplicateOfferingId(OfferingId),

    #[error("student {0} is already registered")]
    DuplicateStudent(StudentId),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// Stable machine-readable code for JSON output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            Self::OfferingNotFound(_) => "OFFERING_NOT_FOUND",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::TimeConflict { .. } => "TIME_CONFLICT",
            Self::CreditLimitExceeded { .. } => "CREDIT_LIMIT_EXCEEDED",
            Self::NotEnrolled { .. } => "NOT_ENROLLED",
            Self::DuplicateOfferingName(_) => "DUPLICATE_OFFERING_NAME",
            Self::DuplicateOfferingId(_) => "DUPLICATE_OFFERING_ID",
            Self::DuplicateStudent(_) => "DUPLICATE_STUDENT",
            Self::Store(_) => "STORE_FAILURE",
        }
    }

    /// Process exit code: 1 for caller mistakes and rule rejections, 3 for
    /// store failures.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Store(_) => 3,
            _ => 1,
        }
    }

    /// Whether the failure came from a business rule rather than bad input
    /// or the store.
    #[must_use]
    pub const fn is_rule_rejection(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. }
                | Self::TimeConflict { .. }
                | Self::CreditLimitExceeded { .. }
                | Self::NotEnrolled { .. }
        )
    }
}

/// Result type alias for registrar-core operations
pub type Result<T> = std::result::Result<T, Error>;
