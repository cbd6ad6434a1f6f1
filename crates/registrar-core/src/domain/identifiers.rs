//! Semantic newtypes for domain identifiers
//!
//! Each identifier validates on construction and cannot hold an
//! out-of-range value afterwards. Serde goes through the same check, so a
//! deserialized identifier is as trustworthy as a parsed one.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Smallest valid student or offering number
pub const ID_MIN: i64 = 1000;
/// Largest valid student or offering number
pub const ID_MAX: i64 = 9999;

/// Four-digit student number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct StudentId(u16);

impl StudentId {
    /// Validate and wrap a student number.
    ///
    /// # Errors
    ///
    /// Returns `StudentIdOutOfRange` unless `1000 <= value <= 9999`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if !(ID_MIN..=ID_MAX).contains(&value) {
            return Err(ValidationError::StudentIdOutOfRange {
                value,
                min: ID_MIN,
                max: ID_MAX,
            });
        }
        u16::try_from(value)
            .map(Self)
            .map_err(|_| ValidationError::StudentIdOutOfRange {
                value,
                min: ID_MIN,
                max: ID_MAX,
            })
    }

    #[must_use]
    pub fn get(self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for StudentId {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StudentId> for i64 {
    fn from(id: StudentId) -> Self {
        id.get()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Four-digit course offering number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct OfferingId(u16);

impl OfferingId {
    /// Validate and wrap an offering number.
    ///
    /// # Errors
    ///
    /// Returns `OfferingIdOutOfRange` unless `1000 <= value <= 9999`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if !(ID_MIN..=ID_MAX).contains(&value) {
            return Err(ValidationError::OfferingIdOutOfRange {
                value,
                min: ID_MIN,
                max: ID_MAX,
            });
        }
        u16::try_from(value)
            .map(Self)
            .map_err(|_| ValidationError::OfferingIdOutOfRange {
                value,
                min: ID_MIN,
                max: ID_MAX,
            })
    }

    #[must_use]
    pub fn get(self) -> i64 {
        i64::from(self.0)
    }
}

impl TryFrom<i64> for OfferingId {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OfferingId> for i64 {
    fn from(id: OfferingId) -> Self {
        id.get()
    }
}

impl fmt::Display for OfferingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned enrollment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct EnrollmentId(i64);

impl EnrollmentId {
    /// # Errors
    ///
    /// Returns `EnrollmentIdNotPositive` for zero or negative values.
    pub const fn new(value: i64) -> Result<Self, ValidationError> {
        if value <= 0 {
            return Err(ValidationError::EnrollmentIdNotPositive { value });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for EnrollmentId {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EnrollmentId> for i64 {
    fn from(id: EnrollmentId) -> Self {
        id.get()
    }
}

impl fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
