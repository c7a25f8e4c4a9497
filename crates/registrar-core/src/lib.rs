//! # registrar-core: Pure Enrollment Rules
//!
//! This crate is the **heart** of the registrar backend. It contains every
//! enrollment rule as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Registrar Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host Surface (HTTP / IPC / CLI)                 │   │
//! │  │    enroll ──► drop ──► submit grades ──► schedule ──► reports   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              registrar-db (EnrollmentEngine)                    │   │
//! │  │    transactions, guarded seat counters, repositories            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ registrar-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  credits  │  │ schedule  │  │  grading  │  │   │
//! │  │   │  Course   │  │  Credits  │  │ ClockTime │  │ pass rule │  │   │
//! │  │   │ Offering  │  │  (tenths) │  │WeeklySlot │  │credit Δ   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Course, CourseOffering, Student, Enrollment, ...)
//! - [`credits`] - Credit type with integer arithmetic (no floating point!)
//! - [`schedule`] - Times of day and weekly slots with overlap math
//! - [`grading`] - Passing rule and credit transition table
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Credits**: All credit values are in tenths (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use registrar_core::credits::Credits;
//! use registrar_core::grading::credit_delta;
//!
//! // Create credits from tenths (never from floats!)
//! let course_credits = Credits::from_tenths(35); // 3.5 credits
//!
//! // Grading an ungraded enrollment with a passing score awards the credits
//! let delta = credit_delta(None, Some(85), course_credits);
//! assert_eq!(delta, course_credits);
//!
//! // Re-grading from one passing score to another changes nothing
//! let delta = credit_delta(Some(85), Some(91), course_credits);
//! assert!(delta.is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod credits;
pub mod error;
pub mod grading;
pub mod schedule;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use registrar_core::Credits` instead of
// `use registrar_core::credits::Credits`

pub use credits::Credits;
pub use error::{EnrollError, EnrollResult, ValidationError};
pub use schedule::{ClockTime, WeeklySlot};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Lowest score that counts as passing a course.
///
/// ## Business Reason
/// A prerequisite is only satisfied by a graded enrollment with a score at or
/// above this threshold, and credits are awarded or revoked when a score
/// crosses it. Keeping it in one place means the grading table and the
/// prerequisite check can never disagree.
pub const PASS_SCORE: i64 = 60;

/// Lowest score a grader may submit.
pub const MIN_SCORE: i64 = 0;

/// Highest score a grader may submit.
pub const MAX_SCORE: i64 = 100;
