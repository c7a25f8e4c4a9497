//! # Enrollment Repository
//!
//! Database operations for enrollment rows and the joined read shapes built
//! on them (schedules, transcripts).
//!
//! Most of this module is transaction-scoped building blocks: the enroll
//! pipeline's rule checks each need to read rows under the same transaction
//! that will insert the enrollment, so they take `&mut SqliteConnection`
//! instead of the pool.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use registrar_core::{ClockTime, Enrollment, Semester, WeeklySlot, PASS_SCORE};

// =============================================================================
// Row Shapes
// =============================================================================

/// One line of a student's schedule: the enrollment joined with everything
/// a timetable wants to print.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduleRow {
    pub offering_id: String,
    pub course_id: String,
    pub course_name: String,
    pub teacher_name: String,
    pub academic_year: String,
    pub semester: Semester,
    pub day_of_week: Option<i64>,
    pub start_minute: Option<i64>,
    pub end_minute: Option<i64>,
    pub location: Option<String>,
    pub score: Option<i64>,
}

impl ScheduleRow {
    /// The weekly meeting, if the offering carries a complete schedule.
    pub fn slot(&self) -> Option<WeeklySlot> {
        slot_from_columns(self.day_of_week, self.start_minute, self.end_minute)
    }
}

/// A scheduled course the student is already committed to. Rows without a
/// complete schedule are filtered out in SQL, so the columns are non-null.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduledCourseRow {
    pub course_name: String,
    pub day_of_week: i64,
    pub start_minute: i64,
    pub end_minute: i64,
}

impl ScheduledCourseRow {
    /// The weekly meeting. `None` only if the stored columns are garbage.
    pub fn slot(&self) -> Option<WeeklySlot> {
        slot_from_columns(
            Some(self.day_of_week),
            Some(self.start_minute),
            Some(self.end_minute),
        )
    }
}

/// One graded line of a student's transcript.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TranscriptRow {
    pub course_id: String,
    pub course_name: String,
    pub credit_tenths: i64,
    pub academic_year: String,
    pub semester: Semester,
    pub teacher_name: String,
    pub score: i64,
}

fn slot_from_columns(
    day: Option<i64>,
    start: Option<i64>,
    end: Option<i64>,
) -> Option<WeeklySlot> {
    let day = u8::try_from(day?).ok()?;
    let start = ClockTime::from_minutes(u16::try_from(start?).ok()?)?;
    let end = ClockTime::from_minutes(u16::try_from(end?).ok()?)?;
    WeeklySlot::new(day, start, end).ok()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for enrollment rows.
///
/// ## Usage
/// ```rust,ignore
/// let repo = EnrollmentRepository::new(pool);
/// let roster = repo.list_for_offering("2024-1-CS101-T001").await?;
/// ```
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    pool: SqlitePool,
}

impl EnrollmentRepository {
    /// Creates a new EnrollmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EnrollmentRepository { pool }
    }

    /// Fetches one enrollment by its composite key.
    pub async fn find(
        &self,
        offering_id: &str,
        student_id: &str,
    ) -> DbResult<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT offering_id, student_id, score, enrolled_at, updated_at
            FROM enrollments
            WHERE offering_id = ?1 AND student_id = ?2
            "#,
        )
        .bind(offering_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enrollment)
    }

    /// Lists the roster of an offering, ordered by student id.
    pub async fn list_for_offering(&self, offering_id: &str) -> DbResult<Vec<Enrollment>> {
        let roster = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT offering_id, student_id, score, enrolled_at, updated_at
            FROM enrollments
            WHERE offering_id = ?1
            ORDER BY student_id
            "#,
        )
        .bind(offering_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roster)
    }

    /// Counts live enrollments for an offering.
    pub async fn count_for_offering(&self, offering_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE offering_id = ?1")
                .bind(offering_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// A student's full schedule across every term, timetable order.
    ///
    /// Unscheduled offerings sort last so printed timetables stay contiguous.
    pub async fn schedule_for_student(&self, student_id: &str) -> DbResult<Vec<ScheduleRow>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT o.offering_id, o.course_id, c.course_name, t.name AS teacher_name,
                   o.academic_year, o.semester,
                   o.day_of_week, o.start_minute, o.end_minute, o.location,
                   e.score
            FROM enrollments e
            JOIN course_offerings o ON o.offering_id = e.offering_id
            JOIN courses c ON c.course_id = o.course_id
            JOIN teachers t ON t.teacher_id = o.teacher_id
            WHERE e.student_id = ?1
            ORDER BY o.day_of_week IS NULL, o.day_of_week, o.start_minute, o.offering_id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// A student's graded history, oldest term first.
    pub async fn transcript_rows(&self, student_id: &str) -> DbResult<Vec<TranscriptRow>> {
        let rows = sqlx::query_as::<_, TranscriptRow>(
            r#"
            SELECT o.course_id, c.course_name, c.credit_tenths,
                   o.academic_year, o.semester,
                   t.name AS teacher_name,
                   e.score
            FROM enrollments e
            JOIN course_offerings o ON o.offering_id = e.offering_id
            JOIN courses c ON c.course_id = o.course_id
            JOIN teachers t ON t.teacher_id = o.teacher_id
            WHERE e.student_id = ?1 AND e.score IS NOT NULL
            ORDER BY o.academic_year, o.semester, o.course_id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ===== Transaction-scoped building blocks =====

    /// Fetches one enrollment inside a caller-owned transaction.
    pub async fn find_in(
        conn: &mut SqliteConnection,
        offering_id: &str,
        student_id: &str,
    ) -> DbResult<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"
            SELECT offering_id, student_id, score, enrolled_at, updated_at
            FROM enrollments
            WHERE offering_id = ?1 AND student_id = ?2
            "#,
        )
        .bind(offering_id)
        .bind(student_id)
        .fetch_optional(conn)
        .await?;

        Ok(enrollment)
    }

    /// Which offering of `course_id` the student already sits in, if any.
    ///
    /// One enrollment per course is allowed across ALL terms, so this does
    /// not filter by academic year or semester.
    pub async fn enrolled_course_in(
        conn: &mut SqliteConnection,
        student_id: &str,
        course_id: &str,
    ) -> DbResult<Option<String>> {
        let offering_id: Option<String> = sqlx::query_scalar(
            r#"
            SELECT e.offering_id
            FROM enrollments e
            JOIN course_offerings o ON o.offering_id = e.offering_id
            WHERE e.student_id = ?1 AND o.course_id = ?2
            LIMIT 1
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(conn)
        .await?;

        Ok(offering_id)
    }

    /// Whether the student has passed `course_id` in any of its offerings.
    pub async fn has_passed_course_in(
        conn: &mut SqliteConnection,
        student_id: &str,
        course_id: &str,
    ) -> DbResult<bool> {
        let passed: i64 = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM enrollments e
                JOIN course_offerings o ON o.offering_id = e.offering_id
                WHERE e.student_id = ?1
                  AND o.course_id = ?2
                  AND e.score >= ?3
            )
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(PASS_SCORE)
        .fetch_one(conn)
        .await?;

        Ok(passed != 0)
    }

    /// Every course the student is committed to that carries a complete
    /// schedule. Courses without day/start/end never conflict and are left out.
    pub async fn scheduled_courses_in(
        conn: &mut SqliteConnection,
        student_id: &str,
    ) -> DbResult<Vec<ScheduledCourseRow>> {
        let rows = sqlx::query_as::<_, ScheduledCourseRow>(
            r#"
            SELECT c.course_name, o.day_of_week, o.start_minute, o.end_minute
            FROM enrollments e
            JOIN course_offerings o ON o.offering_id = e.offering_id
            JOIN courses c ON c.course_id = o.course_id
            WHERE e.student_id = ?1
              AND o.day_of_week IS NOT NULL
              AND o.start_minute IS NOT NULL
              AND o.end_minute IS NOT NULL
            "#,
        )
        .bind(student_id)
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    /// Inserts an ungraded enrollment inside a caller-owned transaction.
    pub async fn insert_in(
        conn: &mut SqliteConnection,
        offering_id: &str,
        student_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Enrollment> {
        debug!(offering_id = %offering_id, student_id = %student_id, "Inserting enrollment");

        sqlx::query(
            r#"
            INSERT INTO enrollments (offering_id, student_id, score, enrolled_at, updated_at)
            VALUES (?1, ?2, NULL, ?3, ?4)
            "#,
        )
        .bind(offering_id)
        .bind(student_id)
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(Enrollment {
            offering_id: offering_id.to_string(),
            student_id: student_id.to_string(),
            score: None,
            enrolled_at: now,
            updated_at: now,
        })
    }

    /// Deletes an enrollment inside a caller-owned transaction.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the row does not exist
    pub async fn delete_in(
        conn: &mut SqliteConnection,
        offering_id: &str,
        student_id: &str,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "DELETE FROM enrollments WHERE offering_id = ?1 AND student_id = ?2",
        )
        .bind(offering_id)
        .bind(student_id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Enrollment",
                Enrollment::compose_id(offering_id, student_id),
            ));
        }

        Ok(())
    }

    /// Overwrites the score inside a caller-owned transaction.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the row does not exist
    pub async fn set_score_in(
        conn: &mut SqliteConnection,
        offering_id: &str,
        student_id: &str,
        score: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments
            SET score = ?3, updated_at = ?4
            WHERE offering_id = ?1 AND student_id = ?2
            "#,
        )
        .bind(offering_id)
        .bind(student_id)
        .bind(score)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Enrollment",
                Enrollment::compose_id(offering_id, student_id),
            ));
        }

        Ok(())
    }
}
