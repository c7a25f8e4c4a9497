//! # Grading Module
//!
//! The passing rule and the credit transition table.
//!
//! ## Credit Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A score write moves an enrollment between three states:               │
//! │                                                                         │
//! │      ungraded (NULL) ──► failing (< 60) ──► passing (>= 60)            │
//! │                                                                         │
//! │  The student's credit total only moves when the PASSING boundary is    │
//! │  crossed:                                                               │
//! │                                                                         │
//! │      old state      new state      credit delta                         │
//! │      ───────────    ───────────    ────────────                        │
//! │      not passing    passing        + course credits                     │
//! │      passing        not passing    - course credits                     │
//! │      anything else  (same side)    0                                    │
//! │                                                                         │
//! │  Re-submitting the same passing score is therefore a no-op; grading    │
//! │  is idempotent by construction, not by separate bookkeeping.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The delta is applied to the student row in the same transaction as the
//! score write. These functions only decide the arithmetic; they never touch
//! storage.

use crate::credits::Credits;
use crate::PASS_SCORE;

// =============================================================================
// Passing Rule
// =============================================================================

/// Whether a (possibly absent) score counts as passing.
///
/// An ungraded enrollment (`None`) never passes. The threshold is
/// [`PASS_SCORE`](crate::PASS_SCORE), inclusive.
///
/// ## Example
/// ```rust
/// use registrar_core::grading::is_passing;
///
/// assert!(is_passing(Some(60)));
/// assert!(is_passing(Some(100)));
/// assert!(!is_passing(Some(59)));
/// assert!(!is_passing(None));
/// ```
#[inline]
pub fn is_passing(score: Option<i64>) -> bool {
    matches!(score, Some(s) if s >= PASS_SCORE)
}

// =============================================================================
// Credit Delta
// =============================================================================

/// Credit adjustment for a score change, per the transition table above.
///
/// `old` is the score currently stored on the enrollment (possibly `None`),
/// `new` the score about to be written. The result is signed: positive to
/// award, negative to revoke, zero when the passing state did not change.
///
/// ## Example
/// ```rust
/// use registrar_core::credits::Credits;
/// use registrar_core::grading::credit_delta;
///
/// let course = Credits::from_tenths(40);
///
/// // First grade, passing: award
/// assert_eq!(credit_delta(None, Some(85), course), course);
///
/// // Correction from passing to failing: revoke
/// assert_eq!(credit_delta(Some(85), Some(40), course), -course);
///
/// // Passing to passing: no movement
/// assert!(credit_delta(Some(85), Some(91), course).is_zero());
/// ```
pub fn credit_delta(old: Option<i64>, new: Option<i64>, course_credits: Credits) -> Credits {
    match (is_passing(old), is_passing(new)) {
        (false, true) => course_credits,
        (true, false) => -course_credits,
        _ => Credits::zero(),
    }
}

// =============================================================================
// Weighted Average
// =============================================================================

/// Credit-weighted average of `(score, credits)` pairs.
///
/// Returns `None` when the pairs carry no credit weight (empty input or all
/// zero-credit courses). Callers decide which enrollments to include; the
/// transcript feeds only passing enrollments through here, so a failed course
/// shows on the record without dragging the average.
pub fn weighted_average<I>(entries: I) -> Option<f64>
where
    I: IntoIterator<Item = (i64, Credits)>,
{
    let mut score_weight: i64 = 0;
    let mut total_weight: i64 = 0;
    for (score, credits) in entries {
        score_weight += score * credits.tenths();
        total_weight += credits.tenths();
    }
    if total_weight == 0 {
        return None;
    }
    Some(score_weight as f64 / total_weight as f64)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const COURSE: Credits = Credits::from_tenths(40);

    #[test]
    fn test_passing_boundary() {
        assert!(!is_passing(Some(59)));
        assert!(is_passing(Some(60)));
        assert!(is_passing(Some(100)));
        assert!(!is_passing(Some(0)));
        assert!(!is_passing(None));
    }

    #[test]
    fn test_first_grade_passing_awards() {
        assert_eq!(credit_delta(None, Some(60), COURSE), COURSE);
        assert_eq!(credit_delta(None, Some(100), COURSE), COURSE);
    }

    #[test]
    fn test_first_grade_failing_awards_nothing() {
        assert!(credit_delta(None, Some(59), COURSE).is_zero());
        assert!(credit_delta(None, Some(0), COURSE).is_zero());
    }

    #[test]
    fn test_fail_to_pass_awards() {
        assert_eq!(credit_delta(Some(40), Some(75), COURSE), COURSE);
        assert_eq!(credit_delta(Some(59), Some(60), COURSE), COURSE);
    }

    #[test]
    fn test_pass_to_fail_revokes() {
        assert_eq!(credit_delta(Some(75), Some(40), COURSE), -COURSE);
        assert_eq!(credit_delta(Some(60), Some(59), COURSE), -COURSE);
    }

    #[test]
    fn test_same_side_changes_nothing() {
        // passing -> passing
        assert!(credit_delta(Some(80), Some(95), COURSE).is_zero());
        // failing -> failing
        assert!(credit_delta(Some(30), Some(50), COURSE).is_zero());
        // identical resubmission
        assert!(credit_delta(Some(85), Some(85), COURSE).is_zero());
    }

    /// Applying the delta of each step of a grade history must equal the
    /// delta of the net transition. Catches double-award bugs.
    #[test]
    fn test_deltas_compose() {
        let history = [None, Some(55), Some(70), Some(70), Some(45), Some(90)];
        let mut total = Credits::zero();
        for pair in history.windows(2) {
            total += credit_delta(pair[0], pair[1], COURSE);
        }
        // Net: ungraded -> 90 (passing), so exactly one award survives.
        assert_eq!(total, COURSE);
    }

    #[test]
    fn test_weighted_average() {
        // 4.0 credits at 80 and 2.0 credits at 50 -> (80*40 + 50*20) / 60 = 70
        let avg = weighted_average([
            (80, Credits::from_tenths(40)),
            (50, Credits::from_tenths(20)),
        ])
        .unwrap();
        assert!((avg - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weighted_average_empty_is_none() {
        assert!(weighted_average(std::iter::empty()).is_none());
        assert!(weighted_average([(90, Credits::zero())]).is_none());
    }
}
