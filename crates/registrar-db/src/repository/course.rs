//! # Course Repository
//!
//! Database operations for the course catalog and prerequisite edges.
//!
//! ## Prerequisite Edges
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                How Prerequisites Are Stored                             │
//! │                                                                         │
//! │  course_prerequisites is a plain edge table:                           │
//! │                                                                         │
//! │      (CS102, CS101)   "CS102 requires CS101"                           │
//! │      (CS103, CS101)   "CS103 requires CS101"                           │
//! │                                                                         │
//! │  Enrollment checks read DIRECT edges only. If CS103 requires CS102     │
//! │  and CS102 requires CS101, enrolling into CS103 checks CS102 alone;    │
//! │  CS101 was already enforced when the student took CS102.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use registrar_core::{validation, Course, ValidationError};

/// Repository for course catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CourseRepository::new(pool);
/// let course = repo.get("CS101").await?;
/// let prereqs = repo.prerequisites_of("CS102").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CourseRepository {
    pool: SqlitePool,
}

impl CourseRepository {
    /// Creates a new CourseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CourseRepository { pool }
    }

    /// Inserts a course into the catalog.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` if the course id already exists
    /// - `DbError::InvalidInput` if id, name or credits fail shape checks
    pub async fn insert(&self, course: &Course) -> DbResult<()> {
        validation::validate_id("course_id", &course.course_id)?;
        validation::validate_name("course_name", &course.name)?;
        validation::validate_credit_tenths(course.credit_tenths)?;

        debug!(course_id = %course.course_id, "Inserting course");

        sqlx::query(
            r#"
            INSERT INTO courses
                (course_id, course_name, credit_tenths, weekly_hours, has_exam, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&course.course_id)
        .bind(&course.name)
        .bind(course.credit_tenths)
        .bind(course.weekly_hours)
        .bind(course.has_exam)
        .bind(course.created_at)
        .bind(course.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a course by id.
    pub async fn get(&self, course_id: &str) -> DbResult<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT course_id, course_name, credit_tenths, weekly_hours, has_exam,
                   created_at, updated_at
            FROM courses
            WHERE course_id = ?1
            "#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    /// Lists the whole catalog, ordered by course id.
    pub async fn list(&self) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT course_id, course_name, credit_tenths, weekly_hours, has_exam,
                   created_at, updated_at
            FROM courses
            ORDER BY course_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    /// Counts catalog entries. Used by the seeder to avoid double-seeding.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Records that `course_id` requires `prerequisite_id`.
    ///
    /// ## Errors
    /// - `DbError::InvalidInput` for a self-edge (a course requiring itself)
    /// - `DbError::ForeignKeyViolation` if either course is missing
    /// - `DbError::UniqueViolation` if the edge already exists
    pub async fn add_prerequisite(
        &self,
        course_id: &str,
        prerequisite_id: &str,
    ) -> DbResult<()> {
        if course_id == prerequisite_id {
            return Err(DbError::InvalidInput(ValidationError::InvalidFormat {
                field: "prerequisite_id".to_string(),
                reason: "a course cannot require itself".to_string(),
            }));
        }

        debug!(course_id = %course_id, prerequisite_id = %prerequisite_id, "Adding prerequisite edge");

        sqlx::query(
            r#"
            INSERT INTO course_prerequisites (course_id, prerequisite_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(course_id)
        .bind(prerequisite_id)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the direct prerequisites of a course.
    pub async fn prerequisites_of(&self, course_id: &str) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT c.course_id, c.course_name, c.credit_tenths, c.weekly_hours, c.has_exam,
                   c.created_at, c.updated_at
            FROM course_prerequisites p
            JOIN courses c ON c.course_id = p.prerequisite_id
            WHERE p.course_id = ?1
            ORDER BY c.course_id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    // ===== Transaction-scoped building blocks =====

    /// Lists direct prerequisites inside a caller-owned transaction.
    ///
    /// Never commits; the engine sequences this into its enrollment
    /// transaction so the edges it checks are the edges it commits against.
    pub async fn prerequisites_in(
        conn: &mut SqliteConnection,
        course_id: &str,
    ) -> DbResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT c.course_id, c.course_name, c.credit_tenths, c.weekly_hours, c.has_exam,
                   c.created_at, c.updated_at
            FROM course_prerequisites p
            JOIN courses c ON c.course_id = p.prerequisite_id
            WHERE p.course_id = ?1
            ORDER BY c.course_id
            "#,
        )
        .bind(course_id)
        .fetch_all(conn)
        .await?;

        Ok(courses)
    }
}
