//! # Schedule Module
//!
//! Times of day and weekly slots, with the overlap rule used to reject
//! conflicting enrollments.
//!
//! ## The Overlap Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Slots are half-open intervals [start, end) on one weekday.            │
//! │                                                                         │
//! │  Two slots on the SAME day overlap unless one ends at or before        │
//! │  the other starts:                                                      │
//! │                                                                         │
//! │      conflict  =  !(end_a <= start_b  ||  end_b <= start_a)            │
//! │                                                                         │
//! │  08:00 ──────── 09:40                                                  │
//! │            09:00 ──────── 10:40      overlap     ► conflict            │
//! │                                                                         │
//! │  08:00 ──────── 09:40                                                  │
//! │                 09:40 ──── 11:20     back-to-back ► no conflict        │
//! │                                                                         │
//! │  Different days never conflict.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Times are stored as integer minutes since midnight so the comparison above
//! is plain integer ordering. No time zones apply; a weekly slot is a local
//! wall-clock fact.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{ValidationError, ValidationResult};

/// Minutes in a day; `ClockTime` values are always below this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

// =============================================================================
// ClockTime
// =============================================================================

/// A time of day with minute precision, stored as minutes since midnight.
///
/// ## Design Decisions
/// - **u16**: 0..1440 fits comfortably; no partial days, no seconds
/// - **Ordering derives**: interval comparison is integer ordering
/// - **Serialized as minutes**: the database and JSON carry the integer;
///   `Display` renders "HH:MM" for reports
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Creates a ClockTime from minutes since midnight.
    ///
    /// Returns `None` if the value does not fall within a day.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::schedule::ClockTime;
    ///
    /// let eight = ClockTime::from_minutes(480).unwrap();
    /// assert_eq!(eight.to_string(), "08:00");
    /// assert!(ClockTime::from_minutes(1440).is_none());
    /// ```
    #[inline]
    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes < MINUTES_PER_DAY {
            Some(ClockTime(minutes))
        } else {
            None
        }
    }

    /// Creates a ClockTime from hour and minute components.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::schedule::ClockTime;
    ///
    /// let t = ClockTime::from_hm(9, 40).unwrap();
    /// assert_eq!(t.minutes(), 580);
    /// assert!(ClockTime::from_hm(24, 0).is_none());
    /// ```
    #[inline]
    pub const fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(ClockTime(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Parses an "HH:MM" string.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::schedule::ClockTime;
    ///
    /// let t = ClockTime::parse("14:30").unwrap();
    /// assert_eq!(t.minutes(), 870);
    /// assert!(ClockTime::parse("25:00").is_err());
    /// assert!(ClockTime::parse("noon").is_err());
    /// ```
    pub fn parse(input: &str) -> ValidationResult<Self> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "time".to_string(),
            reason: reason.to_string(),
        };

        let (hour, minute) = input
            .split_once(':')
            .ok_or_else(|| invalid("expected HH:MM"))?;
        let hour: u16 = hour.parse().map_err(|_| invalid("hour is not a number"))?;
        let minute: u16 = minute
            .parse()
            .map_err(|_| invalid("minute is not a number"))?;

        Self::from_hm(hour, minute).ok_or_else(|| invalid("hour must be 0-23, minute 0-59"))
    }

    /// Returns minutes since midnight.
    #[inline]
    pub const fn minutes(&self) -> u16 {
        self.0
    }

    /// Returns the hour component (0-23).
    #[inline]
    pub const fn hour(&self) -> u16 {
        self.0 / 60
    }

    /// Returns the minute component (0-59).
    #[inline]
    pub const fn minute(&self) -> u16 {
        self.0 % 60
    }
}

/// Renders as zero-padded "HH:MM".
impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

// =============================================================================
// WeeklySlot
// =============================================================================

/// A recurring weekly meeting: one weekday plus a half-open time interval.
///
/// ## Invariants (enforced by [`WeeklySlot::new`])
/// - `day_of_week` is 1 (Monday) through 7 (Sunday)
/// - `start < end`; zero-length and inverted slots are rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeeklySlot {
    /// 1 = Monday .. 7 = Sunday.
    pub day_of_week: u8,
    /// First minute of the meeting (inclusive).
    pub start: ClockTime,
    /// First minute after the meeting (exclusive).
    pub end: ClockTime,
}

impl WeeklySlot {
    /// Creates a validated weekly slot.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::schedule::{ClockTime, WeeklySlot};
    ///
    /// let slot = WeeklySlot::new(
    ///     2,
    ///     ClockTime::from_hm(8, 0).unwrap(),
    ///     ClockTime::from_hm(9, 40).unwrap(),
    /// )
    /// .unwrap();
    /// assert_eq!(slot.day_of_week, 2);
    /// ```
    pub fn new(day_of_week: u8, start: ClockTime, end: ClockTime) -> ValidationResult<Self> {
        if !(1..=7).contains(&day_of_week) {
            return Err(ValidationError::OutOfRange {
                field: "day_of_week".to_string(),
                min: 1,
                max: 7,
            });
        }
        if start >= end {
            return Err(ValidationError::InvalidFormat {
                field: "slot".to_string(),
                reason: format!("start {start} must be before end {end}"),
            });
        }
        Ok(WeeklySlot {
            day_of_week,
            start,
            end,
        })
    }

    /// Whether two slots occupy overlapping wall-clock time.
    ///
    /// Half-open intervals on the same day; back-to-back slots where one ends
    /// exactly as the other starts do NOT overlap.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::schedule::{ClockTime, WeeklySlot};
    ///
    /// let a = WeeklySlot::new(
    ///     1,
    ///     ClockTime::from_hm(8, 0).unwrap(),
    ///     ClockTime::from_hm(9, 40).unwrap(),
    /// )
    /// .unwrap();
    /// let b = WeeklySlot::new(
    ///     1,
    ///     ClockTime::from_hm(9, 0).unwrap(),
    ///     ClockTime::from_hm(10, 40).unwrap(),
    /// )
    /// .unwrap();
    /// assert!(a.overlaps(&b));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &WeeklySlot) -> bool {
        if self.day_of_week != other.day_of_week {
            return false;
        }
        !(self.end <= other.start || other.end <= self.start)
    }

    /// Length of the meeting in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }
}

impl fmt::Display for WeeklySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = match self.day_of_week {
            1 => "Mon",
            2 => "Tue",
            3 => "Wed",
            4 => "Thu",
            5 => "Fri",
            6 => "Sat",
            _ => "Sun",
        };
        write!(f, "{} {}-{}", day, self.start, self.end)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u16, m: u16) -> ClockTime {
        ClockTime::from_hm(h, m).unwrap()
    }

    fn slot(day: u8, start: (u16, u16), end: (u16, u16)) -> WeeklySlot {
        WeeklySlot::new(day, t(start.0, start.1), t(end.0, end.1)).unwrap()
    }

    #[test]
    fn test_clock_time_components() {
        let time = t(9, 40);
        assert_eq!(time.minutes(), 580);
        assert_eq!(time.hour(), 9);
        assert_eq!(time.minute(), 40);
    }

    #[test]
    fn test_clock_time_bounds() {
        assert!(ClockTime::from_minutes(0).is_some());
        assert!(ClockTime::from_minutes(1439).is_some());
        assert!(ClockTime::from_minutes(1440).is_none());
        assert!(ClockTime::from_hm(23, 59).is_some());
        assert!(ClockTime::from_hm(24, 0).is_none());
        assert!(ClockTime::from_hm(12, 60).is_none());
    }

    #[test]
    fn test_clock_time_parse() {
        assert_eq!(ClockTime::parse("08:00").unwrap(), t(8, 0));
        assert_eq!(ClockTime::parse("23:59").unwrap(), t(23, 59));
        assert!(ClockTime::parse("24:00").is_err());
        assert!(ClockTime::parse("0800").is_err());
        assert!(ClockTime::parse("08:xy").is_err());
    }

    #[test]
    fn test_clock_time_display() {
        assert_eq!(t(8, 0).to_string(), "08:00");
        assert_eq!(t(14, 5).to_string(), "14:05");
    }

    #[test]
    fn test_slot_rejects_bad_day() {
        assert!(WeeklySlot::new(0, t(8, 0), t(9, 0)).is_err());
        assert!(WeeklySlot::new(8, t(8, 0), t(9, 0)).is_err());
        assert!(WeeklySlot::new(7, t(8, 0), t(9, 0)).is_ok());
    }

    #[test]
    fn test_slot_rejects_inverted_interval() {
        assert!(WeeklySlot::new(1, t(9, 0), t(8, 0)).is_err());
        assert!(WeeklySlot::new(1, t(9, 0), t(9, 0)).is_err());
    }

    #[test]
    fn test_partial_overlap_conflicts() {
        // Mon 08:00-09:40 vs Mon 09:00-10:40
        let a = slot(1, (8, 0), (9, 40));
        let b = slot(1, (9, 0), (10, 40));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_back_to_back_does_not_conflict() {
        // Mon 08:00-09:40 vs Mon 09:40-11:20; shared boundary minute is fine
        let a = slot(1, (8, 0), (9, 40));
        let b = slot(1, (9, 40), (11, 20));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_containment_conflicts() {
        let outer = slot(3, (8, 0), (12, 0));
        let inner = slot(3, (9, 0), (10, 0));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_identical_slots_conflict() {
        let a = slot(2, (14, 0), (15, 50));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn test_different_days_never_conflict() {
        let mon = slot(1, (8, 0), (9, 40));
        let tue = slot(2, (8, 0), (9, 40));
        assert!(!mon.overlaps(&tue));
    }

    #[test]
    fn test_duration() {
        assert_eq!(slot(1, (8, 0), (9, 40)).duration_minutes(), 100);
    }

    #[test]
    fn test_slot_display() {
        assert_eq!(slot(2, (14, 0), (15, 50)).to_string(), "Tue 14:00-15:50");
    }
}
