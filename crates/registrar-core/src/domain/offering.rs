//! Course offering entity

use chrono::NaiveTime;

use super::{
    identifiers::OfferingId,
    schedule::{TimeSlot, Weekday},
};
use crate::error::ValidationError;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 20;
pub const CAPACITY_MIN: i64 = 1;
pub const CAPACITY_MAX: i64 = 30;
pub const CREDIT_MIN: i64 = 1;
pub const CREDIT_MAX: i64 = 6;

/// A scheduled course section.
///
/// Everything except the enrollment count is fixed at construction. The
/// count always stays within `0..=capacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOffering {
    id: OfferingId,
    name: String,
    capacity: u32,
    credit: u32,
    slot: TimeSlot,
    current_enrollment: u32,
}

impl CourseOffering {
    /// Build an offering with no enrollments.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation: name length (in
    /// characters), capacity range, credit range.
    pub fn new(
        id: OfferingId,
        name: impl Into<String>,
        capacity: i64,
        credit: i64,
        slot: TimeSlot,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let name_chars = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_chars) {
            return Err(ValidationError::NameLength {
                min: NAME_MIN_CHARS,
                max: NAME_MAX_CHARS,
                actual: name_chars,
            });
        }

        let capacity = bounded(capacity, CAPACITY_MIN, CAPACITY_MAX).ok_or(
            ValidationError::CapacityOutOfRange {
                value: capacity,
                min: CAPACITY_MIN,
                max: CAPACITY_MAX,
            },
        )?;

        let credit = bounded(credit, CREDIT_MIN, CREDIT_MAX).ok_or(
            ValidationError::CreditOutOfRange {
                value: credit,
                min: CREDIT_MIN,
                max: CREDIT_MAX,
            },
        )?;

        Ok(Self {
            id,
            name,
            capacity,
            credit,
            slot,
            current_enrollment: 0,
        })
    }

    /// Same offering with a restored enrollment count.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentCountOutOfRange` unless `0 <= count <= capacity`.
    pub fn with_current_enrollment(self, count: i64) -> Result<Self, ValidationError> {
        let current_enrollment = bounded(count, 0, i64::from(self.capacity)).ok_or(
            ValidationError::EnrollmentCountOutOfRange {
                value: count,
                capacity: self.capacity,
            },
        )?;
        Ok(Self {
            current_enrollment,
            ..self
        })
    }

    #[must_use]
    pub const fn id(&self) -> OfferingId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    #[must_use]
    pub const fn credit(&self) -> u32 {
        self.credit
    }

    #[must_use]
    pub const fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    #[must_use]
    pub const fn day(&self) -> Weekday {
        self.slot.day()
    }

    #[must_use]
    pub const fn start_time(&self) -> NaiveTime {
        self.slot.start()
    }

    #[must_use]
    pub const fn end_time(&self) -> NaiveTime {
        self.slot.end()
    }

    #[must_use]
    pub const fn current_enrollment(&self) -> u32 {
        self.current_enrollment
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current_enrollment >= self.capacity
    }

    /// Whether this offering's slot overlaps `other`'s.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.slot.overlaps(&other.slot)
    }
}

fn bounded(value: i64, min: i64, max: i64) -> Option<u32> {
    if (min..=max).contains(&value) {
        u32::try_from(value).ok()
    } else {
        None
    }
}
