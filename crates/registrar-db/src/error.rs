//! # Database Error Types
//!
//! Error types for storage operations and the engine's two-class split.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError::Storage ──┐                                              │
//! │                         ├──► caller maps to its surface                 │
//! │  EngineError::Rule ─────┘    (HTTP status, IPC payload, ...)           │
//! │   (EnrollError from                                                     │
//! │    registrar-core)                                                      │
//! │                                                                         │
//! │  Rule     = the rules said no; retrying the same request is pointless  │
//! │  Storage  = infrastructure failed; the request may be retried          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use registrar_core::{EnrollError, ValidationError};
use thiserror::Error;

// =============================================================================
// DbError
// =============================================================================

/// Storage operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and caller feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - A guarded UPDATE matched nothing
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Creating an offering that already exists for the term
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a course or teacher that does not exist
    /// - Deleting a course that offerings still point at
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Input failed shape validation before reaching SQL.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Offering cannot be cancelled while students hold seats.
    #[error("Offering {offering_id} still has {enrolled} enrolled students")]
    OfferingOccupied { offering_id: String, enrolled: i64 },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed (including writer lock timeouts).
    ///
    /// ## When This Occurs
    /// - "database is locked": another writer held the database past the
    ///   busy timeout; the request may be retried
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                // Busy writer: "database is locked"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked") {
                    DbError::TransactionFailed(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// EngineError
// =============================================================================

/// Outcome classification for engine operations.
///
/// Every engine failure is exactly one of two things:
/// - [`EngineError::Rule`]: the enrollment rules rejected the request.
///   Deterministic; retrying the identical request yields the same answer.
/// - [`EngineError::Storage`]: the infrastructure failed. The transaction was
///   rolled back in full and the request may be retried.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A rule said no. Carries the caller-facing reason.
    #[error(transparent)]
    Rule(#[from] EnrollError),

    /// Storage failed. Full rollback happened; retry is reasonable.
    #[error("Storage failure: {0}")]
    Storage(#[from] DbError),
}

impl EngineError {
    /// Whether this is a deterministic rule rejection.
    pub fn is_rule(&self) -> bool {
        matches!(self, EngineError::Rule(_))
    }

    /// Whether this is a retryable storage failure.
    pub fn is_storage(&self) -> bool {
        matches!(self, EngineError::Storage(_))
    }
}

/// sqlx errors reaching the engine are storage failures by definition.
impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Storage(DbError::from(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors() {
        let err = DbError::not_found("Offering", "2024-1-CS101-T001");
        assert_eq!(err.to_string(), "Offering not found: 2024-1-CS101-T001");

        let err = DbError::duplicate("offering_id", "2024-1-CS101-T001");
        assert_eq!(
            err.to_string(),
            "Duplicate offering_id: '2024-1-CS101-T001' already exists"
        );
    }

    #[test]
    fn test_engine_error_classification() {
        let rule: EngineError = EnrollError::CourseFull {
            offering_id: "2024-1-CS101-T001".to_string(),
        }
        .into();
        assert!(rule.is_rule());
        assert!(!rule.is_storage());

        let storage: EngineError = DbError::PoolExhausted.into();
        assert!(storage.is_storage());
        assert_eq!(storage.to_string(), "Storage failure: Connection pool exhausted");
    }

    #[test]
    fn test_rule_error_message_is_transparent() {
        let err: EngineError = EnrollError::TimeConflict {
            course_name: "Data Structures".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Time conflict with course: Data Structures");
    }
}
