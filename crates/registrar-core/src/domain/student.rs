//! Student and enrollment entities

use super::identifiers::{EnrollmentId, OfferingId, StudentId};
use crate::error::ValidationError;

/// A registered student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Student {
    id: StudentId,
}

impl Student {
    #[must_use]
    pub const fn new(id: StudentId) -> Self {
        Self { id }
    }

    /// Build a student from a raw number.
    ///
    /// # Errors
    ///
    /// Returns `StudentIdOutOfRange` for numbers outside 1000..=9999.
    pub fn from_raw(id: i64) -> Result<Self, ValidationError> {
        StudentId::new(id).map(Self::new)
    }

    #[must_use]
    pub const fn id(&self) -> StudentId {
        self.id
    }
}

/// An enrollment that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEnrollment {
    pub student_id: StudentId,
    pub offering_id: OfferingId,
}

impl NewEnrollment {
    #[must_use]
    pub const fn new(student_id: StudentId, offering_id: OfferingId) -> Self {
        Self {
            student_id,
            offering_id,
        }
    }

    /// Attach the identifier the store assigned.
    #[must_use]
    pub const fn persisted(self, id: EnrollmentId) -> Enrollment {
        Enrollment {
            id,
            student_id: self.student_id,
            offering_id: self.offering_id,
        }
    }
}

/// One live registration of a student in an offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub offering_id: OfferingId,
}
