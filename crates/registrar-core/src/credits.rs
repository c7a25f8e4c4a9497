//! # Credits Module
//!
//! Provides the `Credits` type for handling academic credit values safely.
//!
//! ## Why Integer Credits?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A student ledger that awards and revokes 3.5-credit courses hundreds  │
//! │  of times must land back on EXACTLY the same total, or invariants     │
//! │  like "total equals the sum of passed courses" silently break.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Tenths                                           │
//! │    3.5 credits = 35 tenths. Award 35, revoke 35, total is unchanged.   │
//! │    Comparison and equality are exact; no epsilon anywhere.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use registrar_core::credits::Credits;
//!
//! // Create from tenths (preferred)
//! let credits = Credits::from_tenths(35); // 3.5 credits
//!
//! // Arithmetic operations
//! let total = credits + Credits::from_whole(4); // 7.5 credits
//!
//! // NEVER do this:
//! // let bad = Credits::from_float(3.5); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Credits Type
// =============================================================================

/// Represents an academic credit value in tenths of a credit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for revocation deltas
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Credits Flow
/// ```text
/// Course.credit_tenths ──► credit_delta(old, new, credits)
///                                  │
///                                  ▼
///                    Student.credit_tenths += delta
///                    (same transaction as the score write)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Credits(i64);

impl Credits {
    /// Creates a Credits value from tenths of a credit.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::credits::Credits;
    ///
    /// let credits = Credits::from_tenths(35); // 3.5 credits
    /// assert_eq!(credits.tenths(), 35);
    /// ```
    #[inline]
    pub const fn from_tenths(tenths: i64) -> Self {
        Credits(tenths)
    }

    /// Creates a Credits value from whole credits.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::credits::Credits;
    ///
    /// let credits = Credits::from_whole(4); // 4.0 credits
    /// assert_eq!(credits.tenths(), 40);
    /// ```
    #[inline]
    pub const fn from_whole(whole: i64) -> Self {
        Credits(whole * 10)
    }

    /// Returns the value in tenths of a credit.
    #[inline]
    pub const fn tenths(&self) -> i64 {
        self.0
    }

    /// Returns the whole-credit portion.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::credits::Credits;
    ///
    /// let credits = Credits::from_tenths(35);
    /// assert_eq!(credits.whole_part(), 3);
    /// ```
    #[inline]
    pub const fn whole_part(&self) -> i64 {
        self.0 / 10
    }

    /// Returns the fractional tenth portion (always 0-9).
    #[inline]
    pub const fn tenth_part(&self) -> i64 {
        (self.0 % 10).abs()
    }

    /// Returns zero credits.
    #[inline]
    pub const fn zero() -> Self {
        Credits(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Credits(self.0.abs())
    }

    /// Returns the value as a display float.
    ///
    /// Only for report payloads and UI; ledger arithmetic never touches this.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 10.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows credits in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{}", sign, self.whole_part().abs(), self.tenth_part())
    }
}

/// Default credits is zero.
impl Default for Credits {
    fn default() -> Self {
        Credits::zero()
    }
}

/// Addition of two Credits values.
impl Add for Credits {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Credits(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Credits {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Credits values.
impl Sub for Credits {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Credits(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Credits {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Negation (for revocation deltas).
impl Neg for Credits {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Credits(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tenths() {
        let credits = Credits::from_tenths(35);
        assert_eq!(credits.tenths(), 35);
        assert_eq!(credits.whole_part(), 3);
        assert_eq!(credits.tenth_part(), 5);
    }

    #[test]
    fn test_from_whole() {
        let credits = Credits::from_whole(4);
        assert_eq!(credits.tenths(), 40);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Credits::from_tenths(35)), "3.5");
        assert_eq!(format!("{}", Credits::from_tenths(40)), "4.0");
        assert_eq!(format!("{}", Credits::from_tenths(-35)), "-3.5");
        assert_eq!(format!("{}", Credits::from_tenths(0)), "0.0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Credits::from_tenths(40);
        let b = Credits::from_tenths(35);

        assert_eq!((a + b).tenths(), 75);
        assert_eq!((a - b).tenths(), 5);
        assert_eq!((-b).tenths(), -35);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Credits::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Credits::from_tenths(30);
        assert!(positive.is_positive());

        let negative = Credits::from_tenths(-30);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().tenths(), 30);
    }

    /// Award-then-revoke of the same course must land back on the exact
    /// starting total. This is the property floats cannot promise.
    #[test]
    fn test_award_revoke_round_trip_is_exact() {
        let mut total = Credits::from_tenths(125); // 12.5 credits
        let course = Credits::from_tenths(35);

        for _ in 0..1000 {
            total += course;
            total -= course;
        }

        assert_eq!(total.tenths(), 125);
    }

    #[test]
    fn test_serde_round_trip() {
        let credits = Credits::from_tenths(35);
        let json = serde_json::to_string(&credits).unwrap();
        assert_eq!(json, "35");

        let back: Credits = serde_json::from_str(&json).unwrap();
        assert_eq!(back, credits);
    }
}
