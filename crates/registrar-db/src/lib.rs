//! # registrar-db: Ledger Layer for the Registrar Engine
//!
//! This crate provides storage and the transactional enrollment engine for
//! the registrar system. It uses SQLite for local storage with sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Registrar Data Flow                                │
//! │                                                                         │
//! │  Host surface (HTTP handler, CLI, scheduler job)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   registrar-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐  │   │
//! │  │   │   Database    │   │ EnrollmentEngine│  │  Repositories │  │   │
//! │  │   │   (pool.rs)   │   │   (engine.rs)  │   │ (repository/) │  │   │
//! │  │   │               │   │                │   │               │  │   │
//! │  │   │ SqlitePool    │◄──│ enroll / drop  │◄──│ CourseRepo    │  │   │
//! │  │   │ WAL, busy     │   │ submit_grades  │   │ OfferingRepo  │  │   │
//! │  │   │ timeout,      │   │ schedule /     │   │ EnrollmentRepo│  │   │
//! │  │   │ migrations    │   │ transcript     │   │ ReportRepo    │  │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │        registrar.db (WAL) + embedded migrations                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage and engine error types
//! - [`repository`] - Repository implementations (course, offering, ...)
//! - [`engine`] - The transactional enrollment state machine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registrar_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let config = DbConfig::new("path/to/registrar.db");
//! let db = Database::new(config).await?;
//!
//! // Catalog setup through repositories
//! db.courses().insert(course).await?;
//!
//! // State transitions through the engine
//! let confirmation = db.engine().enroll("S001", "2024-1-CS101-T001").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, EngineError, EngineResult};
pub use pool::{Database, DbConfig};

pub use engine::{
    AvailableOffering, DropConfirmation, EnrollmentConfirmation, EnrollmentEngine, GradeBatchSummary,
    GradeEntry, GradeOutcome, ScheduleEntry, Transcript, TranscriptEntry,
};

// Repository re-exports for convenience
pub use repository::course::CourseRepository;
pub use repository::enrollment::EnrollmentRepository;
pub use repository::offering::{NewOffering, OfferingRepository};
pub use repository::report::{ConflictReport, EnrollmentStatistics, ReportRepository};
pub use repository::student::StudentRepository;
pub use repository::teacher::TeacherRepository;
