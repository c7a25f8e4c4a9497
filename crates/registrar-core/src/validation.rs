//! # Validation Module
//!
//! Input validation utilities for the registrar backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host surface (HTTP handler, CLI, ...)                        │
//! │  ├── Shape checks (deserialization, required params)                   │
//! │  └── Immediate caller feedback                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Identifier and name shape                                          │
//! │  └── Score, capacity, year ranges                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  ├── CHECK constraints (score range, positive capacity)                 │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use registrar_core::validation::{validate_id, validate_score};
//!
//! validate_id("student_id", "S2023001").unwrap();
//! validate_score(85).unwrap();
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::{MAX_SCORE, MIN_SCORE};

// =============================================================================
// String Validators
// =============================================================================

/// Validates a business identifier (student, course, teacher or offering id).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
/// - Must contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use registrar_core::validation::validate_id;
///
/// assert!(validate_id("course_id", "CS101").is_ok());
/// assert!(validate_id("course_id", "").is_err());
/// assert!(validate_id("course_id", "CS 101").is_err());
/// ```
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    // Composed offering ids join segments with hyphens, so the segment
    // charset must stay hyphen-safe
    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (course, student or teacher name).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an academic year string.
///
/// ## Rules
/// - Exactly four ASCII digits ("2024")
///
/// ## Example
/// ```rust
/// use registrar_core::validation::validate_academic_year;
///
/// assert!(validate_academic_year("2024").is_ok());
/// assert!(validate_academic_year("24").is_err());
/// assert!(validate_academic_year("20 24").is_err());
/// ```
pub fn validate_academic_year(year: &str) -> ValidationResult<()> {
    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }

    Err(ValidationError::InvalidFormat {
        field: "academic_year".to_string(),
        reason: "must be four digits, e.g. 2024".to_string(),
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a submitted score.
///
/// ## Rules
/// - Must be between [`MIN_SCORE`](crate::MIN_SCORE) and
///   [`MAX_SCORE`](crate::MAX_SCORE), inclusive
///
/// ## Batch Grading
/// ```text
/// submit_grades entry
///      │
///      ▼
/// validate_score(entry.score) ← THIS FUNCTION
///      │
///      ├── out of range? → entry is skipped, batch continues
///      │
///      └── OK → score written, credit delta applied
/// ```
pub fn validate_score(score: i64) -> ValidationResult<()> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(ValidationError::OutOfRange {
            field: "score".to_string(),
            min: MIN_SCORE,
            max: MAX_SCORE,
        });
    }

    Ok(())
}

/// Validates an offering capacity.
///
/// ## Rules
/// - Must be positive (> 0); an offering nobody can join is a data error
pub fn validate_max_students(max_students: i64) -> ValidationResult<()> {
    if max_students <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "max_students".to_string(),
        });
    }

    Ok(())
}

/// Validates a course credit value in tenths.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero-credit seminars are allowed
pub fn validate_credit_tenths(tenths: i64) -> ValidationResult<()> {
    if tenths < 0 {
        return Err(ValidationError::OutOfRange {
            field: "credit_tenths".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        // Valid ids
        assert!(validate_id("course_id", "CS101").is_ok());
        assert!(validate_id("student_id", "S2023001").is_ok());
        assert!(validate_id("offering_id", "2024-1-CS101-T001").is_ok());

        // Invalid ids
        assert!(validate_id("course_id", "").is_err());
        assert!(validate_id("course_id", "   ").is_err());
        assert!(validate_id("course_id", "CS 101").is_err());
        assert!(validate_id("course_id", &"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("course_name", "Data Structures").is_ok());
        assert!(validate_name("course_name", "").is_err());
        assert!(validate_name("course_name", &"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_academic_year() {
        assert!(validate_academic_year("2024").is_ok());
        assert!(validate_academic_year("1999").is_ok());

        assert!(validate_academic_year("24").is_err());
        assert!(validate_academic_year("20245").is_err());
        assert!(validate_academic_year("2o24").is_err());
        assert!(validate_academic_year("").is_err());
    }

    #[test]
    fn test_validate_score() {
        assert!(validate_score(0).is_ok());
        assert!(validate_score(60).is_ok());
        assert!(validate_score(100).is_ok());

        assert!(validate_score(-1).is_err());
        assert!(validate_score(101).is_err());
    }

    #[test]
    fn test_validate_max_students() {
        assert!(validate_max_students(1).is_ok());
        assert!(validate_max_students(500).is_ok());

        assert!(validate_max_students(0).is_err());
        assert!(validate_max_students(-5).is_err());
    }

    #[test]
    fn test_validate_credit_tenths() {
        assert!(validate_credit_tenths(0).is_ok());
        assert!(validate_credit_tenths(35).is_ok());
        assert!(validate_credit_tenths(-10).is_err());
    }
}
