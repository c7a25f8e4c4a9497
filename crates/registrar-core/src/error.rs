//! # Error Types
//!
//! Domain-specific error types for registrar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  registrar-core errors (this file)                                     │
//! │  ├── EnrollError      - Enrollment rule violations                     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  registrar-db errors (separate crate)                                  │
//! │  ├── DbError          - Storage operation failures                     │
//! │  └── EngineError      - Rule rejection OR storage failure              │
//! │                                                                         │
//! │  Flow: ValidationError → EnrollError → EngineError → caller            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (course name, offering id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message
//!
//! A rejected enrollment is an ordinary answer of the engine, not an anomaly.
//! Every variant here means "the rules said no, with this reason"; storage
//! trouble lives in a separate type so callers can tell the retryable class
//! apart without string matching.

use thiserror::Error;

// =============================================================================
// Enrollment Error
// =============================================================================

/// Enrollment rule violations.
///
/// These errors represent a deliberate rejection by the enrollment rules.
/// The transaction they occurred in has been rolled back; nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollError {
    /// Student id does not exist in the ledger.
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    /// Offering id does not exist in the ledger.
    ///
    /// ## When This Occurs
    /// - Offering id was mistyped or stale
    /// - Offering was cancelled before the request arrived
    #[error("Offering not found: {0}")]
    OfferingNotFound(String),

    /// Student has no enrollment row in the given offering.
    #[error("Student {student_id} is not enrolled in offering {offering_id}")]
    EnrollmentNotFound {
        student_id: String,
        offering_id: String,
    },

    /// Student already holds an enrollment in this course.
    ///
    /// Covers both the same offering twice and a different offering of the
    /// same course. One course, one seat, per student.
    #[error("Already enrolled in course: {course_name}")]
    AlreadyEnrolled { course_name: String },

    /// Every seat in the offering is taken.
    ///
    /// ## When This Occurs
    /// - current_students reached max_students before this request
    /// - A concurrent enrollment won the last seat; exactly one of two
    ///   racing requests receives this error
    #[error("Offering {offering_id} is full")]
    CourseFull { offering_id: String },

    /// The offering's weekly slot overlaps a course the student already has.
    ///
    /// ## Overlap Rule
    /// ```text
    /// Same day, half-open intervals: [start, end)
    ///
    ///   08:00 ─────── 09:40        existing
    ///             09:00 ─────── 10:40   overlaps  ► TimeConflict
    ///                  09:40 ─── 11:20  touches   ► allowed
    /// ```
    #[error("Time conflict with course: {course_name}")]
    TimeConflict { course_name: String },

    /// A direct prerequisite of the course has not been passed.
    #[error("Prerequisite not met: {course_name}")]
    PrerequisiteNotMet { course_name: String },

    /// Enrollment already carries a score and cannot be dropped.
    #[error("Enrollment in offering {offering_id} is graded and cannot be dropped")]
    NotDroppable { offering_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet shape requirements.
/// Used for early validation before rule checks run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed time of day, malformed year).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EnrollError.
pub type EnrollResult<T> = Result<T, EnrollError>;

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EnrollError::TimeConflict {
            course_name: "Data Structures".to_string(),
        };
        assert_eq!(err.to_string(), "Time conflict with course: Data Structures");

        let err = EnrollError::CourseFull {
            offering_id: "2024-1-CS101-T001".to_string(),
        };
        assert_eq!(err.to_string(), "Offering 2024-1-CS101-T001 is full");

        let err = EnrollError::PrerequisiteNotMet {
            course_name: "Data Structures".to_string(),
        };
        assert_eq!(err.to_string(), "Prerequisite not met: Data Structures");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "student_id".to_string(),
        };
        assert_eq!(err.to_string(), "student_id is required");

        let err = ValidationError::OutOfRange {
            field: "score".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "score must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_enroll_error() {
        let validation_err = ValidationError::Required {
            field: "student_id".to_string(),
        };
        let enroll_err: EnrollError = validation_err.into();
        assert!(matches!(enroll_err, EnrollError::Validation(_)));
    }
}
