//! # Teacher Repository
//!
//! Database operations for staff records. Thin by design: teachers are
//! referenced by offerings but carry no ledger state of their own.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use registrar_core::{validation, Teacher};

/// Repository for teacher records.
#[derive(Debug, Clone)]
pub struct TeacherRepository {
    pool: SqlitePool,
}

impl TeacherRepository {
    /// Creates a new TeacherRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TeacherRepository { pool }
    }

    /// Inserts a teacher.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` if the teacher id already exists
    /// - `DbError::InvalidInput` if id or name fail shape checks
    pub async fn insert(&self, teacher: &Teacher) -> DbResult<()> {
        validation::validate_id("teacher_id", &teacher.teacher_id)?;
        validation::validate_name("name", &teacher.name)?;

        debug!(teacher_id = %teacher.teacher_id, "Inserting teacher");

        sqlx::query(
            r#"
            INSERT INTO teachers (teacher_id, name, title, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&teacher.teacher_id)
        .bind(&teacher.name)
        .bind(&teacher.title)
        .bind(teacher.created_at)
        .bind(teacher.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a teacher by id.
    pub async fn get(&self, teacher_id: &str) -> DbResult<Option<Teacher>> {
        let teacher = sqlx::query_as::<_, Teacher>(
            r#"
            SELECT teacher_id, name, title, created_at, updated_at
            FROM teachers
            WHERE teacher_id = ?1
            "#,
        )
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(teacher)
    }

    /// Lists all teachers, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Teacher>> {
        let teachers = sqlx::query_as::<_, Teacher>(
            r#"
            SELECT teacher_id, name, title, created_at, updated_at
            FROM teachers
            ORDER BY teacher_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(teachers)
    }
}
