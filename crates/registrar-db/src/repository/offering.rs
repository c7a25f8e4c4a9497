//! # Offering Repository
//!
//! Database operations for course offerings: section lifecycle and the seat
//! counter.
//!
//! ## The Seat Counter Is Compare-And-Swap
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              How reserve_seat Wins Or Loses Atomically                  │
//! │                                                                         │
//! │  UPDATE course_offerings                                                │
//! │  SET current_students = current_students + 1, ...                      │
//! │  WHERE offering_id = ?1                                                 │
//! │    AND current_students < max_students   ← the guard                   │
//! │                                                                         │
//! │  rows_affected = 1  →  seat reserved                                    │
//! │  rows_affected = 0  →  offering is full (guard failed)                 │
//! │                                                                         │
//! │  The read (guard) and write (increment) are ONE statement, so two      │
//! │  racing requests can never both observe the same free seat. The        │
//! │  status label is recomputed in the same statement and can never        │
//! │  disagree with the counter.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use registrar_core::{
    validation, CourseOffering, OfferingStatus, Semester, WeeklySlot,
};

// =============================================================================
// Inputs and Row Shapes
// =============================================================================

/// Input for creating an offering. The offering id is composed, never chosen.
#[derive(Debug, Clone)]
pub struct NewOffering {
    pub course_id: String,
    pub teacher_id: String,
    pub academic_year: String,
    pub semester: Semester,
    pub max_students: i64,
    /// Weekly meeting, if already scheduled. `None` leaves the offering
    /// unscheduled; it then never participates in conflict checks.
    pub slot: Option<WeeklySlot>,
    pub location: Option<String>,
}

/// An offering joined with the names the caller wants to say back:
/// the course (with its credit value) and the teacher.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferingDetails {
    #[sqlx(flatten)]
    pub offering: CourseOffering,
    pub course_name: String,
    pub credit_tenths: i64,
    pub teacher_name: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for offering lifecycle and seat counters.
///
/// ## Usage
/// ```rust,ignore
/// let repo = OfferingRepository::new(pool);
/// let offering = repo.create(new_offering).await?;
/// let open = repo.list_for_term("2024", Semester::First).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OfferingRepository {
    pool: SqlitePool,
}

impl OfferingRepository {
    /// Creates a new OfferingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OfferingRepository { pool }
    }

    /// Creates an offering for a term.
    ///
    /// The id is composed as `{year}-{semester#}-{course}-{teacher}`, so the
    /// same section created twice collides deterministically.
    ///
    /// ## Errors
    /// - `DbError::InvalidInput` if ids, year or capacity fail shape checks
    /// - `DbError::NotFound` if the course or teacher does not exist
    /// - `DbError::UniqueViolation` if the section already exists
    pub async fn create(&self, new_offering: NewOffering) -> DbResult<CourseOffering> {
        validation::validate_id("course_id", &new_offering.course_id)?;
        validation::validate_id("teacher_id", &new_offering.teacher_id)?;
        validation::validate_academic_year(&new_offering.academic_year)?;
        validation::validate_max_students(new_offering.max_students)?;

        // Friendlier than a raw FK violation out of the INSERT
        let course_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE course_id = ?1")
                .bind(&new_offering.course_id)
                .fetch_one(&self.pool)
                .await?;
        if course_exists == 0 {
            return Err(DbError::not_found("Course", &new_offering.course_id));
        }

        let teacher_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM teachers WHERE teacher_id = ?1")
                .bind(&new_offering.teacher_id)
                .fetch_one(&self.pool)
                .await?;
        if teacher_exists == 0 {
            return Err(DbError::not_found("Teacher", &new_offering.teacher_id));
        }

        let now = Utc::now();
        let offering = CourseOffering {
            offering_id: CourseOffering::compose_id(
                &new_offering.academic_year,
                new_offering.semester,
                &new_offering.course_id,
                &new_offering.teacher_id,
            ),
            course_id: new_offering.course_id,
            teacher_id: new_offering.teacher_id,
            academic_year: new_offering.academic_year,
            semester: new_offering.semester,
            max_students: new_offering.max_students,
            current_students: 0,
            status: OfferingStatus::Open,
            day_of_week: new_offering.slot.map(|s| i64::from(s.day_of_week)),
            start_minute: new_offering.slot.map(|s| i64::from(s.start.minutes())),
            end_minute: new_offering.slot.map(|s| i64::from(s.end.minutes())),
            location: new_offering.location,
            created_at: now,
            updated_at: now,
        };

        debug!(offering_id = %offering.offering_id, "Creating offering");

        sqlx::query(
            r#"
            INSERT INTO course_offerings
                (offering_id, course_id, teacher_id, academic_year, semester,
                 max_students, current_students, status,
                 day_of_week, start_minute, end_minute, location,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&offering.offering_id)
        .bind(&offering.course_id)
        .bind(&offering.teacher_id)
        .bind(&offering.academic_year)
        .bind(offering.semester)
        .bind(offering.max_students)
        .bind(offering.current_students)
        .bind(offering.status)
        .bind(offering.day_of_week)
        .bind(offering.start_minute)
        .bind(offering.end_minute)
        .bind(&offering.location)
        .bind(offering.created_at)
        .bind(offering.updated_at)
        .execute(&self.pool)
        .await?;

        info!(offering_id = %offering.offering_id, "Offering created");
        Ok(offering)
    }

    /// Fetches an offering by id.
    pub async fn get(&self, offering_id: &str) -> DbResult<Option<CourseOffering>> {
        let offering = sqlx::query_as::<_, CourseOffering>(
            r#"
            SELECT offering_id, course_id, teacher_id, academic_year, semester,
                   max_students, current_students, status,
                   day_of_week, start_minute, end_minute, location,
                   created_at, updated_at
            FROM course_offerings
            WHERE offering_id = ?1
            "#,
        )
        .bind(offering_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(offering)
    }

    /// Lists every offering of a term, ordered by id.
    pub async fn list_for_term(
        &self,
        academic_year: &str,
        semester: Semester,
    ) -> DbResult<Vec<CourseOffering>> {
        let offerings = sqlx::query_as::<_, CourseOffering>(
            r#"
            SELECT offering_id, course_id, teacher_id, academic_year, semester,
                   max_students, current_students, status,
                   day_of_week, start_minute, end_minute, location,
                   created_at, updated_at
            FROM course_offerings
            WHERE academic_year = ?1 AND semester = ?2
            ORDER BY offering_id
            "#,
        )
        .bind(academic_year)
        .bind(semester)
        .fetch_all(&self.pool)
        .await?;

        Ok(offerings)
    }

    /// Lists a term's offerings the way one student sees them: sections of
    /// courses the student already holds a seat in, any term, any teacher,
    /// are filtered out entirely.
    pub async fn browse_for_term(
        &self,
        academic_year: &str,
        semester: Semester,
        student_id: &str,
    ) -> DbResult<Vec<OfferingDetails>> {
        let rows = sqlx::query_as::<_, OfferingDetails>(
            r#"
            SELECT o.offering_id, o.course_id, o.teacher_id, o.academic_year, o.semester,
                   o.max_students, o.current_students, o.status,
                   o.day_of_week, o.start_minute, o.end_minute, o.location,
                   o.created_at, o.updated_at,
                   c.course_name, c.credit_tenths,
                   t.name AS teacher_name
            FROM course_offerings o
            JOIN courses c ON c.course_id = o.course_id
            JOIN teachers t ON t.teacher_id = o.teacher_id
            WHERE o.academic_year = ?1 AND o.semester = ?2
              AND NOT EXISTS (
                  SELECT 1
                  FROM enrollments e
                  JOIN course_offerings held ON held.offering_id = e.offering_id
                  WHERE e.student_id = ?3 AND held.course_id = o.course_id
              )
            ORDER BY o.course_id, o.offering_id
            "#,
        )
        .bind(academic_year)
        .bind(semester)
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Cancels an offering that nobody is enrolled in.
    ///
    /// The DELETE is guarded on `current_students = 0`, so a cancel racing
    /// against an enrollment loses cleanly: the enrollment's seat reservation
    /// makes the guard fail.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the offering does not exist
    /// - `DbError::OfferingOccupied` if students still hold seats
    pub async fn cancel(&self, offering_id: &str) -> DbResult<()> {
        debug!(offering_id = %offering_id, "Cancelling offering");

        let result = sqlx::query(
            r#"
            DELETE FROM course_offerings
            WHERE offering_id = ?1 AND current_students = 0
            "#,
        )
        .bind(offering_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Guard failed: missing row or occupied seats. Look again to say which.
            return match self.get(offering_id).await? {
                None => Err(DbError::not_found("Offering", offering_id)),
                Some(offering) => Err(DbError::OfferingOccupied {
                    offering_id: offering_id.to_string(),
                    enrolled: offering.current_students,
                }),
            };
        }

        info!(offering_id = %offering_id, "Offering cancelled");
        Ok(())
    }

    /// Counts offerings. Used by the seeder to avoid double-seeding.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_offerings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Rewrites every drifted seat counter from the enrollment rows.
    ///
    /// A maintenance hatch, not part of any normal flow: counters cannot
    /// drift through this crate's transactions, but an operator poking the
    /// database by hand can be healed here. Returns how many offerings were
    /// corrected.
    pub async fn reconcile_occupancy(&self) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE course_offerings
            SET current_students = (
                    SELECT COUNT(*) FROM enrollments e
                    WHERE e.offering_id = course_offerings.offering_id
                ),
                status = CASE
                    WHEN (SELECT COUNT(*) FROM enrollments e
                          WHERE e.offering_id = course_offerings.offering_id) >= max_students
                    THEN 'full' ELSE 'open'
                END,
                updated_at = ?1
            WHERE current_students <> (
                    SELECT COUNT(*) FROM enrollments e
                    WHERE e.offering_id = course_offerings.offering_id
                )
            "#,
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let corrected = result.rows_affected();
        if corrected > 0 {
            info!(corrected, "Reconciled drifted seat counters");
        }
        Ok(corrected)
    }

    // ===== Transaction-scoped building blocks =====

    /// Fetches an offering inside a caller-owned transaction.
    pub async fn get_in(
        conn: &mut SqliteConnection,
        offering_id: &str,
    ) -> DbResult<Option<CourseOffering>> {
        let offering = sqlx::query_as::<_, CourseOffering>(
            r#"
            SELECT offering_id, course_id, teacher_id, academic_year, semester,
                   max_students, current_students, status,
                   day_of_week, start_minute, end_minute, location,
                   created_at, updated_at
            FROM course_offerings
            WHERE offering_id = ?1
            "#,
        )
        .bind(offering_id)
        .fetch_optional(conn)
        .await?;

        Ok(offering)
    }

    /// Fetches an offering with course and teacher names, inside a
    /// caller-owned transaction.
    pub async fn details_in(
        conn: &mut SqliteConnection,
        offering_id: &str,
    ) -> DbResult<Option<OfferingDetails>> {
        let details = sqlx::query_as::<_, OfferingDetails>(
            r#"
            SELECT o.offering_id, o.course_id, o.teacher_id, o.academic_year, o.semester,
                   o.max_students, o.current_students, o.status,
                   o.day_of_week, o.start_minute, o.end_minute, o.location,
                   o.created_at, o.updated_at,
                   c.course_name, c.credit_tenths,
                   t.name AS teacher_name
            FROM course_offerings o
            JOIN courses c ON c.course_id = o.course_id
            JOIN teachers t ON t.teacher_id = o.teacher_id
            WHERE o.offering_id = ?1
            "#,
        )
        .bind(offering_id)
        .fetch_optional(conn)
        .await?;

        Ok(details)
    }

    /// Tries to take one seat. Guard and increment are a single statement.
    ///
    /// Returns `false` when the offering is full. The caller must have
    /// already established that the offering exists; against a missing id
    /// this also returns `false`.
    pub async fn reserve_seat(
        conn: &mut SqliteConnection,
        offering_id: &str,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE course_offerings
            SET current_students = current_students + 1,
                status = CASE
                    WHEN current_students + 1 >= max_students THEN 'full'
                    ELSE 'open'
                END,
                updated_at = ?2
            WHERE offering_id = ?1
              AND current_students < max_students
            "#,
        )
        .bind(offering_id)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Gives one seat back, flooring the counter at zero.
    ///
    /// After a release at least one seat is free, so the status always
    /// returns to open.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the offering does not exist
    pub async fn release_seat(conn: &mut SqliteConnection, offering_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE course_offerings
            SET current_students = MAX(current_students - 1, 0),
                status = 'open',
                updated_at = ?2
            WHERE offering_id = ?1
            "#,
        )
        .bind(offering_id)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Offering", offering_id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn section(course_id: &str, teacher_id: &str) -> NewOffering {
        NewOffering {
            course_id: course_id.to_string(),
            teacher_id: teacher_id.to_string(),
            academic_year: "2024".to_string(),
            semester: Semester::First,
            max_students: 30,
            slot: Some(testing::slot(1, (8, 0), (9, 40))),
            location: Some("Hall A-101".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_composes_section_id() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;

        let offering = db.offerings().create(section("CS101", "T001")).await.unwrap();
        assert_eq!(offering.offering_id, "2024-1-CS101-T001");
        assert_eq!(offering.current_students, 0);
        assert_eq!(offering.status, OfferingStatus::Open);
        assert_eq!(offering.day_of_week, Some(1));
        assert_eq!(offering.start_minute, Some(480));
        assert_eq!(offering.end_minute, Some(580));
        assert_eq!(offering.location.as_deref(), Some("Hall A-101"));

        let stored = db.offerings().get("2024-1-CS101-T001").await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_create_duplicate_section() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;

        db.offerings().create(section("CS101", "T001")).await.unwrap();
        let duplicate = db.offerings().create(section("CS101", "T001")).await;
        assert!(matches!(duplicate, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_create_checks_references() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;

        match db.offerings().create(section("XX999", "T001")).await {
            Err(DbError::NotFound { entity, id }) => {
                assert_eq!(entity, "Course");
                assert_eq!(id, "XX999");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }

        match db.offerings().create(section("CS101", "T999")).await {
            Err(DbError::NotFound { entity, .. }) => assert_eq!(entity, "Teacher"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_for_term() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;
        testing::create_offering(&db, "CS101", "T001", Semester::First, 30, None).await;
        testing::create_offering(&db, "MA101", "T002", Semester::First, 30, None).await;
        testing::create_offering(&db, "CS102", "T001", Semester::Second, 30, None).await;

        let first = db.offerings().list_for_term("2024", Semester::First).await.unwrap();
        let ids: Vec<&str> = first.iter().map(|o| o.offering_id.as_str()).collect();
        assert_eq!(ids, ["2024-1-CS101-T001", "2024-1-MA101-T002"]);

        let second = db.offerings().list_for_term("2024", Semester::Second).await.unwrap();
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_guards_occupied_sections() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;
        let empty = testing::create_offering(&db, "CS101", "T001", Semester::First, 30, None).await;
        let occupied =
            testing::create_offering(&db, "MA101", "T002", Semester::First, 30, None).await;
        db.engine().enroll("S001", &occupied.offering_id).await.unwrap();

        db.offerings().cancel(&empty.offering_id).await.unwrap();
        assert!(db.offerings().get(&empty.offering_id).await.unwrap().is_none());

        match db.offerings().cancel(&occupied.offering_id).await {
            Err(DbError::OfferingOccupied { enrolled, .. }) => assert_eq!(enrolled, 1),
            other => panic!("expected OfferingOccupied, got {other:?}"),
        }

        // Once the last student leaves, the cancel goes through
        db.engine().drop_course("S001", &occupied.offering_id).await.unwrap();
        db.offerings().cancel(&occupied.offering_id).await.unwrap();

        match db.offerings().cancel("2024-1-NOPE-T001").await {
            Err(DbError::NotFound { .. }) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_release_seat_floors_at_zero() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;
        let offering =
            testing::create_offering(&db, "CS101", "T001", Semester::First, 30, None).await;

        let mut conn = db.pool().acquire().await.unwrap();
        OfferingRepository::release_seat(&mut conn, &offering.offering_id)
            .await
            .unwrap();
        drop(conn);

        let stored = db.offerings().get(&offering.offering_id).await.unwrap().unwrap();
        assert_eq!(stored.current_students, 0);
        assert_eq!(stored.status, OfferingStatus::Open);

        let mut conn = db.pool().acquire().await.unwrap();
        let missing = OfferingRepository::release_seat(&mut conn, "2024-1-NOPE-T001").await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reconcile_occupancy_heals_drift() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;
        let offering =
            testing::create_offering(&db, "CS101", "T001", Semester::First, 30, None).await;
        db.engine().enroll("S001", &offering.offering_id).await.unwrap();

        // Corrupt the counter behind the repository's back
        sqlx::query("UPDATE course_offerings SET current_students = 7, status = 'full' WHERE offering_id = ?1")
            .bind(&offering.offering_id)
            .execute(db.pool())
            .await
            .unwrap();

        let healed = db.offerings().reconcile_occupancy().await.unwrap();
        assert_eq!(healed, 1);

        let stored = db.offerings().get(&offering.offering_id).await.unwrap().unwrap();
        assert_eq!(stored.current_students, 1);
        assert_eq!(stored.status, OfferingStatus::Open);

        // Second pass finds nothing to fix
        assert_eq!(db.offerings().reconcile_occupancy().await.unwrap(), 0);
    }
}
