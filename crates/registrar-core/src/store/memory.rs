//! In-memory store implementing all three store contracts.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EnrollmentStore, OfferingStore, StudentStore};
use crate::{
    domain::{
        CourseOffering, Enrollment, EnrollmentId, NewEnrollment, OfferingId, Student, StudentId,
    },
    error::{StoreError, StoreResult},
};

#[derive(Debug, Default)]
struct State {
    students: BTreeMap<StudentId, Student>,
    offerings: BTreeMap<OfferingId, CourseOffering>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    last_enrollment_id: i64,
}

/// Store that keeps everything in process memory.
///
/// Every call takes the inner lock once, so each call is atomic on its own
/// and nothing more. An optional per-call latency widens the gap between
/// calls so interleavings that a real database would allow show up in
/// tests too.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    latency: Option<Duration>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that sleeps for `latency` before every call.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: RwLock::default(),
            latency: Some(latency),
        }
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn find_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        self.pause().await;
        Ok(self.state.read().await.students.get(&id).copied())
    }

    async fn create_student(&self, student: Student) -> StoreResult<Student> {
        self.pause().await;
        let mut state = self.state.write().await;
        if state.students.contains_key(&student.id()) {
            return Err(StoreError::conflict(format!(
                "student '{}' already exists",
                student.id()
            )));
        }
        state.students.insert(student.id(), student);
        Ok(student)
    }
}

#[async_trait]
impl OfferingStore for MemoryStore {
    async fn find_offering(&self, id: OfferingId) -> StoreResult<Option<CourseOffering>> {
        self.pause().await;
        Ok(self.state.read().await.offerings.get(&id).cloned())
    }

    async fn find_offering_by_name(&self, name: &str) -> StoreResult<Option<CourseOffering>> {
        self.pause().await;
        Ok(self
            .state
            .read()
            .await
            .offerings
            .values()
            .find(|o| o.name() == name)
            .cloned())
    }

    async fn list_offerings(&self) -> StoreResult<Vec<CourseOffering>> {
        self.pause().await;
        Ok(self.state.read().await.offerings.values().cloned().collect())
    }

    async fn create_offering(&self, offering: CourseOffering) -> StoreResult<CourseOffering> {
        self.pause().await;
        let mut state = self.state.write().await;
        if state.offerings.contains_key(&offering.id()) {
            return Err(StoreError::conflict(format!(
                "offering '{}' already exists",
                offering.id()
            )));
        }
        if state.offerings.values().any(|o| o.name() == offering.name()) {
            return Err(StoreError::conflict(format!(
                "offering name '{}' already exists",
                offering.name()
            )));
        }
        state.offerings.insert(offering.id(), offering.clone());
        Ok(offering)
    }

    async fn delete_offering(&self, id: OfferingId) -> StoreResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        if state.offerings.remove(&id).is_none() {
            return Err(StoreError::not_found("offering", id));
        }
        state.enrollments.retain(|_, e| e.offering_id != id);
        Ok(())
    }

    async fn update_offering_count(&self, id: OfferingId, count: u32) -> StoreResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        let current = state
            .offerings
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("offering", id))?;
        match current.clone().with_current_enrollment(i64::from(count)) {
            Ok(updated) => {
                state.offerings.insert(id, updated);
                Ok(())
            }
            Err(e) => {
                state.offerings.insert(id, current);
                Err(StoreError::conflict(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn create_enrollment(&self, enrollment: NewEnrollment) -> StoreResult<Enrollment> {
        self.pause().await;
        let mut state = self.state.write().await;
        let duplicate = state.enrollments.values().any(|e| {
            e.student_id == enrollment.student_id && e.offering_id == enrollment.offering_id
        });
        if duplicate {
            return Err(StoreError::conflict(format!(
                "student '{}' is already enrolled in offering '{}'",
                enrollment.student_id, enrollment.offering_id
            )));
        }

        let id = EnrollmentId::new(state.last_enrollment_id + 1)
            .map_err(|e| StoreError::storage(e.to_string()))?;
        state.last_enrollment_id = id.get();

        let created = enrollment.persisted(id);
        state.enrollments.insert(id, created);
        Ok(created)
    }

    async fn delete_enrollment(
        &self,
        student: StudentId,
        offering: OfferingId,
    ) -> StoreResult<bool> {
        self.pause().await;
        let mut state = self.state.write().await;
        let before = state.enrollments.len();
        state
            .enrollments
            .retain(|_, e| !(e.student_id == student && e.offering_id == offering));
        Ok(state.enrollments.len() != before)
    }

    async fn list_offerings_for_student(
        &self,
        student: StudentId,
    ) -> StoreResult<Vec<CourseOffering>> {
        self.pause().await;
        let state = self.state.read().await;
        let mut offerings: Vec<CourseOffering> = state
            .enrollments
            .values()
            .filter(|e| e.student_id == student)
            .filter_map(|e| state.offerings.get(&e.offering_id).cloned())
            .collect();
        offerings.sort_by_key(CourseOffering::id);
        Ok(offerings)
    }

    async fn count_for_offering(&self, offering: OfferingId) -> StoreResult<u32> {
        self.pause().await;
        let count = self
            .state
            .read()
            .await
            .enrollments
            .values()
            .filter(|e| e.offering_id == offering)
            .count();
        u32::try_from(count).map_err(|e| StoreError::storage(e.to_string()))
    }
}
