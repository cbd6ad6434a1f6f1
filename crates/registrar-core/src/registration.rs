//! Administrative registration of offerings and students.
//!
//! Uniqueness is checked by lookup before insert. Two concurrent creates
//! with the same name can both pass the lookup; the store's own constraint
//! is the backstop and surfaces as `Store(Conflict)`.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    coordination::LockRegistry,
    domain::{parse_time, CourseOffering, OfferingId, Student, StudentId, TimeSlot, Weekday},
    error::{Error, Result},
    response::{OfferingResponse, StudentResponse},
    store::Stores,
};

/// Raw fields for a new offering, as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOfferingRequest {
    pub id: i64,
    pub name: String,
    pub capacity: i64,
    pub credit: i64,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
}

impl CreateOfferingRequest {
    /// Validate every field and build the offering.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first bad field.
    pub fn build(&self) -> Result<CourseOffering> {
        let id = OfferingId::new(self.id)?;
        let day = Weekday::parse(&self.day)?;
        let slot = TimeSlot::new(
            day,
            parse_time(&self.start_time)?,
            parse_time(&self.end_time)?,
        )?;
        Ok(CourseOffering::new(
            id,
            self.name.clone(),
            self.capacity,
            self.credit,
            slot,
        )?)
    }
}

/// Create, find, list and delete course offerings.
#[derive(Debug, Clone)]
pub struct OfferingService {
    stores: Stores,
    locks: Arc<LockRegistry<OfferingId>>,
}

impl OfferingService {
    /// `locks` should be the registry the enrollment coordinator uses, so a
    /// delete cannot interleave with an enroll on the same offering.
    #[must_use]
    pub const fn new(stores: Stores, locks: Arc<LockRegistry<OfferingId>>) -> Self {
        Self { stores, locks }
    }

    /// # Errors
    ///
    /// - `InvalidInput` for any field failure
    /// - `DuplicateOfferingName` / `DuplicateOfferingId`
    /// - `Store` for store failures
    pub async fn create(&self, request: &CreateOfferingRequest) -> Result<OfferingResponse> {
        let offering = request.build()?;

        if self
            .stores
            .offerings
            .find_offering_by_name(offering.name())
            .await?
            .is_some()
        {
            return Err(Error::DuplicateOfferingName(offering.name().to_string()));
        }

        if self
            .stores
            .offerings
            .find_offering(offering.id())
            .await?
            .is_some()
        {
            return Err(Error::DuplicateOfferingId(offering.id()));
        }

        let created = self.stores.offerings.create_offering(offering).await?;
        info!(offering = %created.id(), name = created.name(), "offering created");
        Ok(created.into())
    }

    /// # Errors
    ///
    /// Returns `OfferingNotFound` if absent.
    pub async fn find(&self, id: OfferingId) -> Result<OfferingResponse> {
        self.stores
            .offerings
            .find_offering(id)
            .await?
            .map(OfferingResponse::from)
            .ok_or(Error::OfferingNotFound(id))
    }

    /// All offerings, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the listing fails.
    pub async fn list(&self) -> Result<Vec<OfferingResponse>> {
        let offerings = self.stores.offerings.list_offerings().await?;
        debug!(count = offerings.len(), "offerings listed");
        Ok(offerings.iter().map(OfferingResponse::from).collect())
    }

    /// Delete an offering and its enrollments.
    ///
    /// # Errors
    ///
    /// Returns `OfferingNotFound` if absent.
    pub async fn delete(&self, id: OfferingId) -> Result<()> {
        let _guard = self.locks.acquire(id).await;

        if self.stores.offerings.find_offering(id).await?.is_none() {
            return Err(Error::OfferingNotFound(id));
        }
        self.stores.offerings.delete_offering(id).await?;
        info!(offering = %id, "offering deleted");
        Ok(())
    }
}

/// Register students.
#[derive(Debug, Clone)]
pub struct StudentService {
    stores: Stores,
}

impl StudentService {
    #[must_use]
    pub const fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// # Errors
    ///
    /// - `InvalidInput` when the number is outside 1000..=9999
    /// - `DuplicateStudent` when already registered
    /// - `Store` for store failures
    pub async fn register(&self, id: i64) -> Result<StudentResponse> {
        let student = Student::from_raw(id)?;

        if self
            .stores
            .students
            .find_student(student.id())
            .await?
            .is_some()
        {
            return Err(Error::DuplicateStudent(student.id()));
        }

        let saved = self.stores.students.create_student(student).await?;
        info!(student = %saved.id(), "student registered");
        Ok(saved.into())
    }

    /// # Errors
    ///
    /// Returns `StudentNotFound` if absent.
    pub async fn find(&self, id: StudentId) -> Result<StudentResponse> {
        self.stores
            .students
            .find_student(id)
            .await?
            .map(StudentResponse::from)
            .ok_or(Error::StudentNotFound(id))
    }
}
