//! # Student Repository
//!
//! Database operations for student records and their credit totals.
//!
//! ## The Credit Total Is A Ledger Value
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  students.credit_tenths only moves through adjust_credits, and         │
//! │  adjust_credits only runs inside the transaction that writes the      │
//! │  score change justifying the movement:                                 │
//! │                                                                         │
//! │      BEGIN IMMEDIATE                                                   │
//! │        UPDATE enrollments SET score = 85 ...                           │
//! │        UPDATE students SET credit_tenths = credit_tenths + 40 ...      │
//! │      COMMIT                                                            │
//! │                                                                         │
//! │  Either both land or neither does. A crash between the two is          │
//! │  impossible to observe.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use registrar_core::{validation, Credits, Student};

/// Repository for student records.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: SqlitePool,
}

impl StudentRepository {
    /// Creates a new StudentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StudentRepository { pool }
    }

    /// Inserts a student.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` if the student id already exists
    /// - `DbError::InvalidInput` if id or name fail shape checks
    pub async fn insert(&self, student: &Student) -> DbResult<()> {
        validation::validate_id("student_id", &student.student_id)?;
        validation::validate_name("name", &student.name)?;
        validation::validate_credit_tenths(student.credit_tenths)?;

        debug!(student_id = %student.student_id, "Inserting student");

        sqlx::query(
            r#"
            INSERT INTO students (student_id, name, credit_tenths, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&student.student_id)
        .bind(&student.name)
        .bind(student.credit_tenths)
        .bind(student.created_at)
        .bind(student.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a student by id.
    pub async fn get(&self, student_id: &str) -> DbResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT student_id, name, credit_tenths, created_at, updated_at
            FROM students
            WHERE student_id = ?1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    /// Lists all students, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT student_id, name, credit_tenths, created_at, updated_at
            FROM students
            ORDER BY student_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    // ===== Transaction-scoped building blocks =====

    /// Fetches a student inside a caller-owned transaction.
    pub async fn get_in(
        conn: &mut SqliteConnection,
        student_id: &str,
    ) -> DbResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT student_id, name, credit_tenths, created_at, updated_at
            FROM students
            WHERE student_id = ?1
            "#,
        )
        .bind(student_id)
        .fetch_optional(conn)
        .await?;

        Ok(student)
    }

    /// Applies a signed credit delta to a student's running total.
    ///
    /// The total is floored at zero; a revocation can never drive the ledger
    /// negative even against drifted data. Zero deltas are the caller's job
    /// to skip.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the student row does not exist
    pub async fn adjust_credits(
        conn: &mut SqliteConnection,
        student_id: &str,
        delta: Credits,
    ) -> DbResult<()> {
        debug!(student_id = %student_id, delta = %delta, "Adjusting credit total");

        let result = sqlx::query(
            r#"
            UPDATE students
            SET credit_tenths = MAX(credit_tenths + ?2, 0),
                updated_at = ?3
            WHERE student_id = ?1
            "#,
        )
        .bind(student_id)
        .bind(delta.tenths())
        .bind(Utc::now())
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Student", student_id));
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

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = testing::memory_db().await;

        db.students()
            .insert(&testing::student("S001", "Evan Park"))
            .await
            .unwrap();

        let stored = db.students().get("S001").await.unwrap().unwrap();
        assert_eq!(stored.name, "Evan Park");
        assert_eq!(stored.credit_tenths, 0);

        let duplicate = db.students().insert(&testing::student("S001", "Imposter")).await;
        assert!(matches!(duplicate, Err(DbError::UniqueViolation { .. })));

        let invalid = db.students().insert(&testing::student("", "No Id")).await;
        assert!(matches!(invalid, Err(DbError::InvalidInput(_))));

        assert!(db.students().get("S999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_adjust_credits_floors_at_zero() {
        let db = testing::memory_db().await;
        db.students()
            .insert(&testing::student("S001", "Evan Park"))
            .await
            .unwrap();

        // Stay on one connection; the in-memory pool has exactly one
        let mut conn = db.pool().acquire().await.unwrap();

        StudentRepository::adjust_credits(&mut conn, "S001", Credits::from_tenths(40))
            .await
            .unwrap();
        StudentRepository::adjust_credits(&mut conn, "S001", Credits::from_tenths(-30))
            .await
            .unwrap();
        let student = StudentRepository::get_in(&mut conn, "S001").await.unwrap().unwrap();
        assert_eq!(student.credit_tenths, 10);

        // Revoking more than the balance clamps instead of going negative
        StudentRepository::adjust_credits(&mut conn, "S001", Credits::from_tenths(-50))
            .await
            .unwrap();
        let student = StudentRepository::get_in(&mut conn, "S001").await.unwrap().unwrap();
        assert_eq!(student.credit_tenths, 0);

        let missing =
            StudentRepository::adjust_credits(&mut conn, "S999", Credits::from_tenths(10)).await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }
}
