//! # Report Repository
//!
//! Read-only administrative reporting over offerings and enrollments.
//!
//! ## Exact-Key Conflict Grouping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The term-wide conflict report groups offerings by the EXACT           │
//! │  (day, start, end) key:                                                 │
//! │                                                                         │
//! │    Mon 08:00-09:40   CS101 / T001   ┐                                  │
//! │    Mon 08:00-09:40   MA201 / T002   ┘ one conflict group               │
//! │    Mon 08:30-10:00   PH150 / T003     different key, no group          │
//! │                                                                         │
//! │  This is deliberately stricter and cheaper than the per-student        │
//! │  interval-overlap test: an auditor scanning a whole term wants          │
//! │  identical slots flagged, and partially-overlapping slots are           │
//! │  legitimate for disjoint student populations.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::DbResult;
use registrar_core::{ClockTime, Semester};

// =============================================================================
// Report Shapes
// =============================================================================

/// One offering inside a conflict group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictingOffering {
    pub offering_id: String,
    pub course_name: String,
    pub teacher_name: String,
}

/// Offerings sharing one exact (day, start, end) slot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictGroup {
    /// 1 = Monday .. 7 = Sunday.
    pub day_of_week: i64,
    pub start_minute: i64,
    pub end_minute: i64,
    pub offerings: Vec<ConflictingOffering>,
}

impl ConflictGroup {
    /// Human-readable slot, e.g. "Mon 08:00-09:40".
    pub fn label(&self) -> String {
        let day = match self.day_of_week {
            1 => "Mon",
            2 => "Tue",
            3 => "Wed",
            4 => "Thu",
            5 => "Fri",
            6 => "Sat",
            7 => "Sun",
            _ => "???",
        };
        let fmt = |minutes: i64| {
            u16::try_from(minutes)
                .ok()
                .and_then(ClockTime::from_minutes)
                .map(|t| t.to_string())
                .unwrap_or_else(|| "??:??".to_string())
        };
        format!(
            "{} {}-{}",
            day,
            fmt(self.start_minute),
            fmt(self.end_minute)
        )
    }
}

/// Term-wide slot audit: every exact slot shared by more than one offering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub academic_year: String,
    pub semester: Semester,
    /// Offerings in the term that carry a complete schedule.
    pub scheduled_count: i64,
    /// Distinct (day, start, end) keys among them.
    pub unique_slot_count: i64,
    pub conflicts: Vec<ConflictGroup>,
}

/// Aggregate occupancy over a filtered set of offerings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentStatistics {
    pub total_offerings: i64,
    pub total_capacity: i64,
    pub total_enrolled: i64,
    pub full_offerings: i64,
    pub open_offerings: i64,
    /// `total_enrolled / total_capacity`; 0.0 when there is no capacity.
    pub occupancy_rate: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct ScheduledOfferingRow {
    offering_id: String,
    course_name: String,
    teacher_name: String,
    day_of_week: i64,
    start_minute: i64,
    end_minute: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OccupancyRow {
    total_offerings: i64,
    total_capacity: i64,
    total_enrolled: i64,
    full_offerings: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for administrative reports. Read-only.
///
/// ## Usage
/// ```rust,ignore
/// let reports = ReportRepository::new(pool);
/// let audit = reports.conflict_report("2024", Semester::First).await?;
/// for group in &audit.conflicts {
///     println!("{}: {} offerings", group.label(), group.offerings.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Audits a term for offerings sharing an exact weekly slot.
    pub async fn conflict_report(
        &self,
        academic_year: &str,
        semester: Semester,
    ) -> DbResult<ConflictReport> {
        let rows = sqlx::query_as::<_, ScheduledOfferingRow>(
            r#"
            SELECT o.offering_id, c.course_name, t.name AS teacher_name,
                   o.day_of_week, o.start_minute, o.end_minute
            FROM course_offerings o
            JOIN courses c ON c.course_id = o.course_id
            JOIN teachers t ON t.teacher_id = o.teacher_id
            WHERE o.academic_year = ?1
              AND o.semester = ?2
              AND o.day_of_week IS NOT NULL
              AND o.start_minute IS NOT NULL
              AND o.end_minute IS NOT NULL
            ORDER BY o.day_of_week, o.start_minute, o.end_minute, o.offering_id
            "#,
        )
        .bind(academic_year)
        .bind(semester)
        .fetch_all(&self.pool)
        .await?;

        let scheduled_count = rows.len() as i64;

        // BTreeMap keeps groups in weekday order without a second sort
        let mut slots: BTreeMap<(i64, i64, i64), Vec<ConflictingOffering>> = BTreeMap::new();
        for row in rows {
            slots
                .entry((row.day_of_week, row.start_minute, row.end_minute))
                .or_default()
                .push(ConflictingOffering {
                    offering_id: row.offering_id,
                    course_name: row.course_name,
                    teacher_name: row.teacher_name,
                });
        }

        let unique_slot_count = slots.len() as i64;
        let conflicts: Vec<ConflictGroup> = slots
            .into_iter()
            .filter(|(_, offerings)| offerings.len() > 1)
            .map(|((day_of_week, start_minute, end_minute), offerings)| ConflictGroup {
                day_of_week,
                start_minute,
                end_minute,
                offerings,
            })
            .collect();

        debug!(
            academic_year = %academic_year,
            scheduled = scheduled_count,
            conflict_groups = conflicts.len(),
            "Built conflict report"
        );

        Ok(ConflictReport {
            academic_year: academic_year.to_string(),
            semester,
            scheduled_count,
            unique_slot_count,
            conflicts,
        })
    }

    /// Aggregate occupancy, optionally filtered by year and/or semester.
    ///
    /// `None` filters match everything, so `enrollment_statistics(None, None)`
    /// covers the whole catalog.
    pub async fn enrollment_statistics(
        &self,
        academic_year: Option<&str>,
        semester: Option<Semester>,
    ) -> DbResult<EnrollmentStatistics> {
        let row = sqlx::query_as::<_, OccupancyRow>(
            r#"
            SELECT COUNT(*) AS total_offerings,
                   COALESCE(SUM(max_students), 0) AS total_capacity,
                   COALESCE(SUM(current_students), 0) AS total_enrolled,
                   COALESCE(SUM(CASE WHEN status = 'full' THEN 1 ELSE 0 END), 0)
                       AS full_offerings
            FROM course_offerings
            WHERE (?1 IS NULL OR academic_year = ?1)
              AND (?2 IS NULL OR semester = ?2)
            "#,
        )
        .bind(academic_year)
        .bind(semester)
        .fetch_one(&self.pool)
        .await?;

        let occupancy_rate = if row.total_capacity > 0 {
            row.total_enrolled as f64 / row.total_capacity as f64
        } else {
            0.0
        };

        Ok(EnrollmentStatistics {
            total_offerings: row.total_offerings,
            total_capacity: row.total_capacity,
            total_enrolled: row.total_enrolled,
            full_offerings: row.full_offerings,
            open_offerings: row.total_offerings - row.full_offerings,
            occupancy_rate,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_conflict_report_groups_exact_slots_only() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;

        // Two sections on the identical slot
        testing::create_offering(
            &db,
            "CS101",
            "T001",
            Semester::First,
            30,
            Some(testing::slot(1, (8, 0), (9, 40))),
        )
        .await;
        testing::create_offering(
            &db,
            "MA101",
            "T002",
            Semester::First,
            30,
            Some(testing::slot(1, (8, 0), (9, 40))),
        )
        .await;
        // Overlaps both but on a different key, so it joins no group
        testing::create_offering(
            &db,
            "CS101",
            "T002",
            Semester::First,
            30,
            Some(testing::slot(1, (8, 0), (10, 0))),
        )
        .await;
        // Unscheduled and other-term sections stay out of the report
        testing::create_offering(&db, "MA101", "T001", Semester::First, 30, None).await;
        testing::create_offering(
            &db,
            "CS102",
            "T001",
            Semester::Second,
            30,
            Some(testing::slot(1, (8, 0), (9, 40))),
        )
        .await;

        let report = db.reports().conflict_report("2024", Semester::First).await.unwrap();
        assert_eq!(report.scheduled_count, 3);
        assert_eq!(report.unique_slot_count, 2);
        assert_eq!(report.conflicts.len(), 1);

        let group = &report.conflicts[0];
        assert_eq!(group.label(), "Mon 08:00-09:40");
        let ids: Vec<&str> = group
            .offerings
            .iter()
            .map(|o| o.offering_id.as_str())
            .collect();
        assert_eq!(ids, ["2024-1-CS101-T001", "2024-1-MA101-T002"]);
    }

    #[tokio::test]
    async fn test_conflict_report_empty_term() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;

        let report = db.reports().conflict_report("2024", Semester::First).await.unwrap();
        assert_eq!(report.scheduled_count, 0);
        assert_eq!(report.unique_slot_count, 0);
        assert!(report.conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_enrollment_statistics() {
        let db = testing::memory_db().await;
        testing::seed_catalog(&db).await;
        let busy = testing::create_offering(&db, "CS101", "T001", Semester::First, 10, None).await;
        let tiny = testing::create_offering(&db, "MA101", "T002", Semester::First, 1, None).await;
        testing::create_offering(&db, "CS102", "T001", Semester::Second, 5, None).await;

        db.engine().enroll("S001", &busy.offering_id).await.unwrap();
        db.engine().enroll("S002", &busy.offering_id).await.unwrap();
        db.engine().enroll("S003", &tiny.offering_id).await.unwrap();

        let term = db
            .reports()
            .enrollment_statistics(Some("2024"), Some(Semester::First))
            .await
            .unwrap();
        assert_eq!(term.total_offerings, 2);
        assert_eq!(term.total_capacity, 11);
        assert_eq!(term.total_enrolled, 3);
        assert_eq!(term.full_offerings, 1);
        assert_eq!(term.open_offerings, 1);
        assert!((term.occupancy_rate - 3.0 / 11.0).abs() < 1e-9);

        let all = db.reports().enrollment_statistics(None, None).await.unwrap();
        assert_eq!(all.total_offerings, 3);
        assert_eq!(all.total_capacity, 16);
        assert_eq!(all.total_enrolled, 3);

        // A term with no offerings reports zeros, not a division error
        let empty = db
            .reports()
            .enrollment_statistics(Some("2030"), None)
            .await
            .unwrap();
        assert_eq!(empty.total_offerings, 0);
        assert_eq!(empty.occupancy_rate, 0.0);
    }
}
