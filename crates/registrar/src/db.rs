//! `SQLite` persistence for students, offerings and enrollments
//!
//! - Connection pooling through `SqlitePool`
//! - Embedded schema executed on open (no migration files)
//! - Foreign keys on, so deleting an offering cascades to its enrollments
//!
//! Each store call is one statement and therefore atomic on its own.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use registrar_core::{
    domain::{parse_time, Weekday},
    CourseOffering, Enrollment, EnrollmentId, EnrollmentStore, NewEnrollment, OfferingId,
    OfferingStore, StoreError, StoreResult, Student, StudentId, StudentStore, TimeSlot,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow},
    Row, SqlitePool,
};
use tracing::debug;

/// Database schema as SQL string - executed once on open
const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY CHECK(id BETWEEN 1000 AND 9999)
);

CREATE TABLE IF NOT EXISTS offerings (
    id INTEGER PRIMARY KEY CHECK(id BETWEEN 1000 AND 9999),
    name TEXT NOT NULL UNIQUE,
    capacity INTEGER NOT NULL CHECK(capacity BETWEEN 1 AND 30),
    credit INTEGER NOT NULL CHECK(credit BETWEEN 1 AND 6),
    day TEXT NOT NULL CHECK(day IN ('MON', 'TUE', 'WED', 'THU', 'FRI')),
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    current_enrollment INTEGER NOT NULL DEFAULT 0
        CHECK(current_enrollment BETWEEN 0 AND capacity),
    CHECK(start_time < end_time)
);

CREATE TABLE IF NOT EXISTS enrollments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    offering_id INTEGER NOT NULL REFERENCES offerings(id) ON DELETE CASCADE,
    UNIQUE(student_id, offering_id)
);

CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments(student_id);
CREATE INDEX IF NOT EXISTS idx_enrollments_offering ON enrollments(offering_id);
";

const OFFERING_COLUMNS: &str =
    "o.id, o.name, o.capacity, o.credit, o.day, o.start_time, o.end_time, o.current_enrollment";

const MAX_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Store backed by a `SQLite` file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub async fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::storage(format!(
                    "failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::storage(format!("failed to connect to database: {e}")))?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::storage(format!("failed to initialize schema: {e}")))?;

        debug!(path = %path.display(), "database opened");
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Unique and CHECK violations are the store refusing a write; anything else
/// is the store failing.
fn map_write_error(context: &str, e: &sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_check_violation() => {
            StoreError::conflict(format!("{context}: {db}"))
        }
        _ => StoreError::storage(format!("{context}: {e}")),
    }
}

fn read_error(context: &str, e: &sqlx::Error) -> StoreError {
    StoreError::storage(format!("{context}: {e}"))
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| StoreError::storage(format!("failed to read {name}: {e}")))
}

#[allow(clippy::needless_pass_by_value)]
fn parse_offering_row(row: SqliteRow) -> StoreResult<CourseOffering> {
    let corrupt = |e: registrar_core::ValidationError| {
        StoreError::storage(format!("corrupt offering row: {e}"))
    };

    let id = OfferingId::new(column(&row, "id")?).map_err(corrupt)?;
    let day = Weekday::parse(&column::<String>(&row, "day")?).map_err(corrupt)?;
    let start = parse_time(&column::<String>(&row, "start_time")?).map_err(corrupt)?;
    let end = parse_time(&column::<String>(&row, "end_time")?).map_err(corrupt)?;
    let slot = TimeSlot::new(day, start, end).map_err(corrupt)?;
    let current: i64 = column(&row, "current_enrollment")?;

    CourseOffering::new(
        id,
        column::<String>(&row, "name")?,
        column(&row, "capacity")?,
        column(&row, "credit")?,
        slot,
    )
    .and_then(|offering| offering.with_current_enrollment(current))
    .map_err(corrupt)
}

#[async_trait]
impl StudentStore for SqliteStore {
    async fn find_student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM students WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("failed to query student", &e))?;
        Ok(found.map(|_| Student::new(id)))
    }

    async fn create_student(&self, student: Student) -> StoreResult<Student> {
        sqlx::query("INSERT INTO students (id) VALUES (?)")
            .bind(student.id().get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("failed to create student", &e))?;
        Ok(student)
    }
}

#[async_trait]
impl OfferingStore for SqliteStore {
    async fn find_offering(&self, id: OfferingId) -> StoreResult<Option<CourseOffering>> {
        sqlx::query(&format!("SELECT {OFFERING_COLUMNS} FROM offerings o WHERE o.id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("failed to query offering", &e))?
            .map(parse_offering_row)
            .transpose()
    }

    async fn find_offering_by_name(&self, name: &str) -> StoreResult<Option<CourseOffering>> {
        sqlx::query(&format!("SELECT {OFFERING_COLUMNS} FROM offerings o WHERE o.name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error("failed to query offering", &e))?
            .map(parse_offering_row)
            .transpose()
    }

    async fn list_offerings(&self) -> StoreResult<Vec<CourseOffering>> {
        sqlx::query(&format!("SELECT {OFFERING_COLUMNS} FROM offerings o ORDER BY o.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| read_error("failed to list offerings", &e))?
            .into_iter()
            .map(parse_offering_row)
            .collect()
    }

    async fn create_offering(&self, offering: CourseOffering) -> StoreResult<CourseOffering> {
        sqlx::query(
            "INSERT INTO offerings
             (id, name, capacity, credit, day, start_time, end_time, current_enrollment)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(offering.id().get())
        .bind(offering.name())
        .bind(offering.capacity())
        .bind(offering.credit())
        .bind(offering.day().to_string())
        .bind(registrar_core::domain::format_time(offering.start_time()))
        .bind(registrar_core::domain::format_time(offering.end_time()))
        .bind(offering.current_enrollment())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("failed to create offering", &e))?;
        Ok(offering)
    }

    async fn delete_offering(&self, id: OfferingId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM offerings WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("failed to delete offering", &e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("offering", id));
        }
        Ok(())
    }

    async fn update_offering_count(&self, id: OfferingId, count: u32) -> StoreResult<()> {
        let result = sqlx::query("UPDATE offerings SET current_enrollment = ? WHERE id = ?")
            .bind(count)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("failed to update enrollment count", &e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("offering", id));
        }
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for SqliteStore {
    async fn create_enrollment(&self, enrollment: NewEnrollment) -> StoreResult<Enrollment> {
        let rowid = sqlx::query("INSERT INTO enrollments (student_id, offering_id) VALUES (?, ?)")
            .bind(enrollment.student_id.get())
            .bind(enrollment.offering_id.get())
            .execute(&self.pool)
            .await
            .map(|result| result.last_insert_rowid())
            .map_err(|e| map_write_error("failed to create enrollment", &e))?;

        EnrollmentId::new(rowid)
            .map(|id| enrollment.persisted(id))
            .map_err(|e| StoreError::storage(e.to_string()))
    }

    async fn delete_enrollment(
        &self,
        student: StudentId,
        offering: OfferingId,
    ) -> StoreResult<bool> {
        sqlx::query("DELETE FROM enrollments WHERE student_id = ? AND offering_id = ?")
            .bind(student.get())
            .bind(offering.get())
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected() > 0)
            .map_err(|e| map_write_error("failed to delete enrollment", &e))
    }

    async fn list_offerings_for_student(
        &self,
        student: StudentId,
    ) -> StoreResult<Vec<CourseOffering>> {
        sqlx::query(&format!(
            "SELECT {OFFERING_COLUMNS} FROM offerings o
             JOIN enrollments e ON e.offering_id = o.id
             WHERE e.student_id = ?
             ORDER BY o.id"
        ))
        .bind(student.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error("failed to list offerings for student", &e))?
        .into_iter()
        .map(parse_offering_row)
        .collect()
    }

    async fn count_for_offering(&self, offering: OfferingId) -> StoreResult<u32> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE offering_id = ?")
                .bind(offering.get())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| read_error("failed to count enrollments", &e))?;
        u32::try_from(count).map_err(|e| StoreError::storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use registrar_core::{EnrollmentCoordinator, Error, Stores};
    use tempfile::TempDir;

    use super::*;

    async fn open() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = SqliteStore::open(&dir.path().join("nested").join("test.db"))
            .await
            .expect("opened");
        (dir, store)
    }

    fn offering(id: i64, name: &str, capacity: i64) -> CourseOffering {
        let slot = TimeSlot::new(
            Weekday::Tue,
            parse_time("09:00").expect("valid"),
            parse_time("10:30").expect("valid"),
        )
        .expect("valid slot");
        CourseOffering::new(OfferingId::new(id).expect("valid"), name, capacity, 3, slot)
            .expect("valid offering")
    }

    fn student(id: i64) -> StudentId {
        StudentId::new(id).expect("valid")
    }

    #[tokio::test]
    async fn test_offering_round_trip() {
        let (_dir, store) = open().await;
        let created = store
            .create_offering(offering(2001, "Databases", 30))
            .await
            .expect("created");

        let found = store
            .find_offering(created.id())
            .await
            .expect("queried")
            .expect("present");
        assert_eq!(found, created);
        assert_eq!(
            store
                .find_offering_by_name("Databases")
                .await
                .expect("queried")
                .map(|o| o.id()),
            Some(created.id())
        );
    }

    #[tokio::test]
    async fn test_duplicates_are_conflicts() {
        let (_dir, store) = open().await;
        store.create_student(Student::new(student(1001))).await.expect("created");
        assert!(matches!(
            store.create_student(Student::new(student(1001))).await,
            Err(StoreError::Conflict(_))
        ));

        store.create_offering(offering(2001, "Databases", 30)).await.expect("created");
        assert!(matches!(
            store.create_offering(offering(2002, "Databases", 30)).await,
            Err(StoreError::Conflict(_))
        ));

        let pair = NewEnrollment::new(student(1001), OfferingId::new(2001).expect("valid"));
        store.create_enrollment(pair).await.expect("created");
        assert!(matches!(
            store.create_enrollment(pair).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_count_update_respects_capacity() {
        let (_dir, store) = open().await;
        let o = store.create_offering(offering(2001, "Seminar", 2)).await.expect("created");

        store.update_offering_count(o.id(), 2).await.expect("within capacity");
        assert!(matches!(
            store.update_offering_count(o.id(), 3).await,
            Err(StoreError::Conflict(_))
        ));
        assert!(matches!(
            store
                .update_offering_count(OfferingId::new(9999).expect("valid"), 1)
                .await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_offering_listing_order_and_cascade() {
        let (_dir, store) = open().await;
        store.create_student(Student::new(student(1001))).await.expect("created");
        let later = store
            .create_offering(offering(2002, "Networks", 30))
            .await
            .expect("created");
        let earlier = store
            .create_offering(offering(2001, "Databases", 30))
            .await
            .expect("created");

        store
            .create_enrollment(NewEnrollment::new(student(1001), later.id()))
            .await
            .expect("created");
        store
            .create_enrollment(NewEnrollment::new(student(1001), earlier.id()))
            .await
            .expect("created");

        let offerings: Vec<i64> = store
            .list_offerings_for_student(student(1001))
            .await
            .expect("listed")
            .iter()
            .map(|o| o.id().get())
            .collect();
        assert_eq!(offerings, vec![2001, 2002]);

        store.delete_offering(later.id()).await.expect("deleted");
        assert_eq!(store.count_for_offering(later.id()).await.expect("counted"), 0);
        let remaining: Vec<i64> = store
            .list_offerings_for_student(student(1001))
            .await
            .expect("listed")
            .iter()
            .map(|o| o.id().get())
            .collect();
        assert_eq!(remaining, vec![2001]);
    }

    #[tokio::test]
    async fn test_delete_enrollment_reports_match() {
        let (_dir, store) = open().await;
        store.create_student(Student::new(student(1001))).await.expect("created");
        let o = store.create_offering(offering(2001, "Databases", 30)).await.expect("created");
        store
            .create_enrollment(NewEnrollment::new(student(1001), o.id()))
            .await
            .expect("created");

        assert!(store.delete_enrollment(student(1001), o.id()).await.expect("deleted"));
        assert!(!store.delete_enrollment(student(1001), o.id()).await.expect("deleted"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_enrolls_fill_exactly_to_capacity() {
        let (_dir, store) = open().await;
        let store = Arc::new(store);
        let o = store.create_offering(offering(2001, "Seminar", 3)).await.expect("created");
        for id in 1001..1011 {
            store.create_student(Student::new(student(id))).await.expect("created");
        }

        let coordinator = EnrollmentCoordinator::with_stores(Stores::shared(Arc::clone(&store)));
        let tasks: Vec<_> = (1001..1011)
            .map(|id| {
                let coordinator = coordinator.clone();
                let offering_id = o.id();
                tokio::spawn(async move { coordinator.enroll(student(id), offering_id).await })
            })
            .collect();

        let mut accepted = 0;
        for task in tasks {
            match task.await.expect("task completed") {
                Ok(_) => accepted += 1,
                Err(e) => assert!(matches!(e, Error::CapacityExceeded { .. }), "{e}"),
            }
        }

        assert_eq!(accepted, 3);
        assert_eq!(store.count_for_offering(o.id()).await.expect("counted"), 3);
        let stored = store.find_offering(o.id()).await.expect("queried").expect("present");
        assert_eq!(stored.current_enrollment(), 3);
    }
}
