//! # Domain Types
//!
//! Core domain types used throughout the registrar backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │     Course      │   │  CourseOffering  │   │   Enrollment    │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  course_id      │◄──│  course_id (FK)  │◄──│  offering_id    │      │
//! │  │  name           │   │  teacher_id (FK) │   │  student_id     │      │
//! │  │  credit_tenths  │   │  max_students    │   │  score (NULL    │      │
//! │  │  has_exam       │   │  current_students│   │   until graded) │      │
//! │  └─────────────────┘   │  day/start/end   │   └─────────────────┘      │
//! │                        └──────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Student     │   │     Teacher     │   │ OfferingStatus  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  student_id     │   │  teacher_id     │   │  Open           │       │
//! │  │  credit_tenths  │   │  name, title    │   │  Full           │       │
//! │  │  (running total)│   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! Identifiers are caller-visible business strings, composed deterministically
//! where derived: an offering id is `{year}-{semester#}-{course}-{teacher}`,
//! so the same section always gets the same id on every machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::credits::Credits;
use crate::grading;
use crate::schedule::{ClockTime, WeeklySlot};

// =============================================================================
// Semester
// =============================================================================

/// Half of an academic year.
///
/// Stored as lowercase text in the database; rendered as 1 or 2 inside
/// composed offering ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Semester {
    /// Autumn term; number 1.
    First,
    /// Spring term; number 2.
    Second,
}

impl Semester {
    /// Returns the ordinal used in composed offering ids (1 or 2).
    #[inline]
    pub const fn number(&self) -> u8 {
        match self {
            Semester::First => 1,
            Semester::Second => 2,
        }
    }

    /// Parses the ordinal form. Anything but 1 or 2 is `None`.
    #[inline]
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Semester::First),
            2 => Some(Semester::Second),
            _ => None,
        }
    }

    /// Database text form ("first" / "second").
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Semester::First => "first",
            Semester::Second => "second",
        }
    }
}

// =============================================================================
// Offering Status
// =============================================================================

/// Derived capacity label on an offering.
///
/// Always recomputed in the same statement that moves the seat counter, so
/// the label can never disagree with the numbers it summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OfferingStatus {
    /// Seats remain.
    Open,
    /// current_students reached max_students.
    Full,
}

impl OfferingStatus {
    /// The label implied by a seat counter.
    #[inline]
    pub const fn for_occupancy(current_students: i64, max_students: i64) -> Self {
        if current_students >= max_students {
            OfferingStatus::Full
        } else {
            OfferingStatus::Open
        }
    }
}

impl Default for OfferingStatus {
    fn default() -> Self {
        OfferingStatus::Open
    }
}

// =============================================================================
// Course
// =============================================================================

/// A catalog entry. Offerings below are concrete sections of a course.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Course {
    /// Business identifier, e.g. "CS101".
    pub course_id: String,

    /// Display name shown on schedules and transcripts.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "course_name"))]
    pub name: String,

    /// Credit value in tenths (40 = 4.0 credits).
    pub credit_tenths: i64,

    /// Contact hours per week (catalog metadata).
    pub weekly_hours: i64,

    /// Whether the course ends in a written exam.
    pub has_exam: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Returns the credit value as a Credits type.
    #[inline]
    pub fn credits(&self) -> Credits {
        Credits::from_tenths(self.credit_tenths)
    }
}

// =============================================================================
// Teacher
// =============================================================================

/// A member of staff who can hold offerings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Teacher {
    pub teacher_id: String,
    pub name: String,
    /// Academic title ("Professor", "Lecturer", ...).
    pub title: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Student
// =============================================================================

/// A student and their running credit total.
///
/// `credit_tenths` is a ledger value: it only moves inside the same
/// transaction as the score change that justifies the movement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    /// Credits earned so far, in tenths. Never negative.
    pub credit_tenths: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Returns the earned credit total as a Credits type.
    #[inline]
    pub fn total_credits(&self) -> Credits {
        Credits::from_tenths(self.credit_tenths)
    }
}

// =============================================================================
// Course Offering
// =============================================================================

/// A concrete section of a course in one term.
///
/// ## Seat Counter
/// `current_students` equals the number of enrollment rows pointing at this
/// offering. It is only moved by guarded UPDATEs inside the transaction that
/// inserts or deletes the enrollment row, so readers never observe a counter
/// that disagrees with the rows.
///
/// ## Schedule Fields
/// The weekly slot is three nullable columns. An offering with ANY of them
/// missing has no schedule yet and is skipped by the conflict check; see
/// [`CourseOffering::slot`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CourseOffering {
    /// Composed id: `{year}-{semester#}-{course}-{teacher}`.
    pub offering_id: String,

    pub course_id: String,

    pub teacher_id: String,

    /// Calendar year the academic year starts in, e.g. "2024".
    pub academic_year: String,

    pub semester: Semester,

    /// Seat capacity. Always positive.
    pub max_students: i64,

    /// Live seat counter; 0 <= current_students <= max_students.
    pub current_students: i64,

    /// Derived label; "full" exactly when no seats remain.
    pub status: OfferingStatus,

    /// 1 = Monday .. 7 = Sunday, or NULL while unscheduled.
    pub day_of_week: Option<i64>,

    /// Minutes since midnight, inclusive start.
    pub start_minute: Option<i64>,

    /// Minutes since midnight, exclusive end.
    pub end_minute: Option<i64>,

    /// Room string, e.g. "B201".
    pub location: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CourseOffering {
    /// Composes the deterministic offering id.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::types::{CourseOffering, Semester};
    ///
    /// let id = CourseOffering::compose_id("2024", Semester::First, "CS101", "T001");
    /// assert_eq!(id, "2024-1-CS101-T001");
    /// ```
    pub fn compose_id(
        academic_year: &str,
        semester: Semester,
        course_id: &str,
        teacher_id: &str,
    ) -> String {
        format!(
            "{}-{}-{}-{}",
            academic_year,
            semester.number(),
            course_id,
            teacher_id
        )
    }

    /// The offering's weekly slot, if its schedule is complete and sane.
    ///
    /// Returns `None` when any of the three schedule columns is missing or
    /// holds an out-of-range value; such offerings never participate in
    /// conflict checks.
    pub fn slot(&self) -> Option<WeeklySlot> {
        let day = u8::try_from(self.day_of_week?).ok()?;
        let start = u16::try_from(self.start_minute?)
            .ok()
            .and_then(ClockTime::from_minutes)?;
        let end = u16::try_from(self.end_minute?)
            .ok()
            .and_then(ClockTime::from_minutes)?;
        WeeklySlot::new(day, start, end).ok()
    }

    /// Whether every seat is taken.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.current_students >= self.max_students
    }

    /// Seats still available (never negative).
    #[inline]
    pub fn seats_left(&self) -> i64 {
        (self.max_students - self.current_students).max(0)
    }
}

// =============================================================================
// Enrollment
// =============================================================================

/// One student's seat in one offering.
///
/// The `(offering_id, student_id)` pair is the primary key; `score` stays
/// NULL until the teacher grades, and a non-NULL score locks the row against
/// dropping.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Enrollment {
    pub offering_id: String,
    pub student_id: String,
    /// NULL until graded; 0-100 afterwards.
    pub score: Option<i64>,
    #[ts(as = "String")]
    pub enrolled_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Composes the enrollment identifier from its two halves.
    ///
    /// ## Example
    /// ```rust
    /// use registrar_core::Enrollment;
    ///
    /// let id = Enrollment::compose_id("2024-1-CS101-T001", "S001");
    /// assert_eq!(id, "2024-1-CS101-T001-S001");
    /// ```
    pub fn compose_id(offering_id: &str, student_id: &str) -> String {
        format!("{offering_id}-{student_id}")
    }

    /// Whether a score has been recorded.
    #[inline]
    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }

    /// Whether the recorded score passes.
    #[inline]
    pub fn is_passed(&self) -> bool {
        grading::is_passing(self.score)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn offering(day: Option<i64>, start: Option<i64>, end: Option<i64>) -> CourseOffering {
        CourseOffering {
            offering_id: "2024-1-CS101-T001".to_string(),
            course_id: "CS101".to_string(),
            teacher_id: "T001".to_string(),
            academic_year: "2024".to_string(),
            semester: Semester::First,
            max_students: 50,
            current_students: 0,
            status: OfferingStatus::Open,
            day_of_week: day,
            start_minute: start,
            end_minute: end,
            location: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_semester_numbers() {
        assert_eq!(Semester::First.number(), 1);
        assert_eq!(Semester::Second.number(), 2);
        assert_eq!(Semester::from_number(2), Some(Semester::Second));
        assert_eq!(Semester::from_number(3), None);
    }

    #[test]
    fn test_status_for_occupancy() {
        assert_eq!(OfferingStatus::for_occupancy(0, 50), OfferingStatus::Open);
        assert_eq!(OfferingStatus::for_occupancy(49, 50), OfferingStatus::Open);
        assert_eq!(OfferingStatus::for_occupancy(50, 50), OfferingStatus::Full);
    }

    #[test]
    fn test_compose_id() {
        let id = CourseOffering::compose_id("2024", Semester::Second, "CS103", "T002");
        assert_eq!(id, "2024-2-CS103-T002");
    }

    #[test]
    fn test_slot_requires_all_three_columns() {
        assert!(offering(Some(2), Some(480), Some(580)).slot().is_some());
        assert!(offering(None, Some(480), Some(580)).slot().is_none());
        assert!(offering(Some(2), None, Some(580)).slot().is_none());
        assert!(offering(Some(2), Some(480), None).slot().is_none());
    }

    #[test]
    fn test_slot_rejects_garbage_columns() {
        // day out of range
        assert!(offering(Some(9), Some(480), Some(580)).slot().is_none());
        // inverted interval
        assert!(offering(Some(2), Some(580), Some(480)).slot().is_none());
        // minutes past the end of the day
        assert!(offering(Some(2), Some(480), Some(2000)).slot().is_none());
    }

    #[test]
    fn test_seats_left_floors_at_zero() {
        let mut o = offering(None, None, None);
        o.current_students = 50;
        assert_eq!(o.seats_left(), 0);
        assert!(o.is_full());
        // drifted data must not go negative through this accessor
        o.current_students = 55;
        assert_eq!(o.seats_left(), 0);
    }

    #[test]
    fn test_enrollment_passing() {
        let mut e = Enrollment {
            offering_id: "2024-1-CS101-T001".to_string(),
            student_id: "S001".to_string(),
            score: None,
            enrolled_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!e.is_graded());
        assert!(!e.is_passed());

        e.score = Some(59);
        assert!(e.is_graded());
        assert!(!e.is_passed());

        e.score = Some(60);
        assert!(e.is_passed());
    }

    #[test]
    fn test_course_credits() {
        let course = Course {
            course_id: "CS101".to_string(),
            name: "Data Structures".to_string(),
            credit_tenths: 40,
            weekly_hours: 4,
            has_exam: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(course.credits(), Credits::from_whole(4));
    }
}
