//! # Enrollment Engine
//!
//! The transactional heart of the registrar: every state transition on
//! (student, offering) pairs goes through here, inside one write transaction.
//!
//! ## The Enroll Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              enroll(student, offering) — one transaction                │
//! │                                                                         │
//! │  BEGIN IMMEDIATE        serializes against other writers at BEGIN      │
//! │    1. student exists            ── else StudentNotFound                │
//! │    2. offering exists           ── else OfferingNotFound               │
//! │    3. not already in offering   ── else AlreadyEnrolled                │
//! │    4. not in same course twice  ── else AlreadyEnrolled                │
//! │    5. reserve a seat (CAS)      ── else CourseFull                     │
//! │    6. no schedule overlap       ── else TimeConflict                   │
//! │    7. prerequisites passed      ── else PrerequisiteNotMet             │
//! │    8. insert enrollment row                                             │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any rejection after step 5 rolls the reservation back with the        │
//! │  transaction; a refused student never leaves a phantom seat behind.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `BEGIN IMMEDIATE` takes the writer slot up front. Two racing enrollments
//! serialize at step 0; the loser re-reads committed state, so one wins the
//! last seat and the other deterministically gets `CourseFull` instead of a
//! lock error.
//!
//! Grading is different on purpose: a batch is N independent transactions,
//! one per entry, so one bad entry skips without touching its neighbors.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Connection, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DbError, EngineError, EngineResult};
use crate::repository::course::CourseRepository;
use crate::repository::enrollment::{EnrollmentRepository, ScheduleRow};
use crate::repository::offering::{OfferingDetails, OfferingRepository};
use crate::repository::student::StudentRepository;
use registrar_core::{
    grading, validation, ClockTime, Credits, EnrollError, Enrollment, OfferingStatus, Semester,
};

// =============================================================================
// Operation Results
// =============================================================================

/// What a successful enrollment tells the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentConfirmation {
    pub enrollment_id: String,
    pub offering_id: String,
    pub course_name: String,
    pub teacher_name: String,
    /// Occupancy including the seat this enrollment just took.
    pub current_students: i64,
    pub max_students: i64,
}

/// What a successful drop tells the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropConfirmation {
    pub offering_id: String,
    pub course_name: String,
}

/// One (student, score) pair of a grade batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEntry {
    pub student_id: String,
    pub score: i64,
}

/// How one grade entry fared. Skips are recorded, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GradeOutcome {
    /// Score written; credit ledger moved if the pass state flipped.
    #[serde(rename_all = "camelCase")]
    Updated {
        student_id: String,
        old_score: Option<i64>,
        new_score: i64,
    },
    /// The student holds no enrollment in this offering.
    #[serde(rename_all = "camelCase")]
    SkippedNotEnrolled { student_id: String },
    /// The score is outside 0..=100.
    #[serde(rename_all = "camelCase")]
    SkippedInvalidScore { student_id: String, score: i64 },
}

/// Result of a grade batch: the count callers contractually get, plus the
/// per-entry record that says exactly which entries were skipped and why.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBatchSummary {
    pub offering_id: String,
    pub updated_count: i64,
    pub outcomes: Vec<GradeOutcome>,
}

/// One line of a student's timetable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub offering_id: String,
    pub course_id: String,
    pub course_name: String,
    pub teacher_name: String,
    pub academic_year: String,
    pub semester: Semester,
    /// 1 = Monday .. 7 = Sunday; `None` when unscheduled.
    pub day_of_week: Option<i64>,
    /// "HH:MM", `None` when unscheduled.
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub score: Option<i64>,
}

impl From<ScheduleRow> for ScheduleEntry {
    fn from(row: ScheduleRow) -> Self {
        ScheduleEntry {
            start: format_minutes(row.start_minute),
            end: format_minutes(row.end_minute),
            offering_id: row.offering_id,
            course_id: row.course_id,
            course_name: row.course_name,
            teacher_name: row.teacher_name,
            academic_year: row.academic_year,
            semester: row.semester,
            day_of_week: row.day_of_week,
            location: row.location,
            score: row.score,
        }
    }
}

/// One catalog line as a particular student browses a term. Sections of
/// courses the student already holds never make it into the list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableOffering {
    pub offering_id: String,
    pub course_id: String,
    pub course_name: String,
    pub teacher_name: String,
    /// Credit value in tenths, matching how [`Credits`] serializes.
    pub credits: Credits,
    pub day_of_week: Option<i64>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub current_students: i64,
    pub max_students: i64,
    pub status: OfferingStatus,
    /// Seats remain. A coarse pre-check only; enroll re-runs every rule
    /// transactionally.
    pub available: bool,
}

impl From<OfferingDetails> for AvailableOffering {
    fn from(row: OfferingDetails) -> Self {
        let available = !row.offering.is_full();
        AvailableOffering {
            offering_id: row.offering.offering_id,
            course_id: row.offering.course_id,
            course_name: row.course_name,
            teacher_name: row.teacher_name,
            credits: Credits::from_tenths(row.credit_tenths),
            day_of_week: row.offering.day_of_week,
            start: format_minutes(row.offering.start_minute),
            end: format_minutes(row.offering.end_minute),
            location: row.offering.location,
            current_students: row.offering.current_students,
            max_students: row.offering.max_students,
            status: row.offering.status,
            available,
        }
    }
}

/// One graded line of a transcript.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub course_id: String,
    pub course_name: String,
    pub credits: Credits,
    pub academic_year: String,
    pub semester: Semester,
    pub teacher_name: String,
    pub score: i64,
    pub passed: bool,
}

/// A student's graded history with the ledger totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub student_id: String,
    pub student_name: String,
    pub entries: Vec<TranscriptEntry>,
    /// The stored credit ledger; equals the sum over passed entries.
    pub total_credits: Credits,
    /// Credit-weighted mean of passing scores. `None` with no passed
    /// credit-bearing courses.
    pub weighted_average: Option<f64>,
}

fn format_minutes(minutes: Option<i64>) -> Option<String> {
    minutes
        .and_then(|m| u16::try_from(m).ok())
        .and_then(ClockTime::from_minutes)
        .map(|t| t.to_string())
}

// =============================================================================
// Engine
// =============================================================================

/// Runs the enrollment state machine over pooled SQLite.
///
/// ## Usage
/// ```rust,ignore
/// let engine = EnrollmentEngine::new(pool);
/// match engine.enroll("S001", "2024-1-CS101-T001").await {
///     Ok(confirmation) => println!("enrolled into {}", confirmation.course_name),
///     Err(e) if e.is_rule() => println!("refused: {e}"),
///     Err(e) => return Err(e),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EnrollmentEngine {
    pool: SqlitePool,
}

impl EnrollmentEngine {
    /// Creates a new EnrollmentEngine.
    pub fn new(pool: SqlitePool) -> Self {
        EnrollmentEngine { pool }
    }

    /// Enrolls a student into an offering, running the full rule pipeline
    /// inside one immediate-mode transaction.
    ///
    /// ## Errors
    /// Rule rejections, in check order: `StudentNotFound`, `OfferingNotFound`,
    /// `AlreadyEnrolled`, `CourseFull`, `TimeConflict`, `PrerequisiteNotMet`.
    /// Storage failures roll the whole attempt back.
    pub async fn enroll(
        &self,
        student_id: &str,
        offering_id: &str,
    ) -> EngineResult<EnrollmentConfirmation> {
        validation::validate_id("student_id", student_id).map_err(EnrollError::from)?;
        validation::validate_id("offering_id", offering_id).map_err(EnrollError::from)?;

        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        let mut tx = conn
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;

        if StudentRepository::get_in(&mut tx, student_id).await?.is_none() {
            return Self::reject(tx, EnrollError::StudentNotFound(student_id.to_string())).await;
        }

        let Some(details) = OfferingRepository::details_in(&mut tx, offering_id).await? else {
            return Self::reject(tx, EnrollError::OfferingNotFound(offering_id.to_string())).await;
        };

        if EnrollmentRepository::find_in(&mut tx, offering_id, student_id)
            .await?
            .is_some()
        {
            return Self::reject(
                tx,
                EnrollError::AlreadyEnrolled {
                    course_name: details.course_name,
                },
            )
            .await;
        }

        if let Some(held) =
            EnrollmentRepository::enrolled_course_in(&mut tx, student_id, &details.offering.course_id)
                .await?
        {
            debug!(
                student_id = %student_id,
                held_offering = %held,
                "Student already sits in another offering of this course"
            );
            return Self::reject(
                tx,
                EnrollError::AlreadyEnrolled {
                    course_name: details.course_name,
                },
            )
            .await;
        }

        if !OfferingRepository::reserve_seat(&mut tx, offering_id).await? {
            return Self::reject(
                tx,
                EnrollError::CourseFull {
                    offering_id: offering_id.to_string(),
                },
            )
            .await;
        }

        // Overlap check only applies when the target has a complete schedule
        if let Some(candidate) = details.offering.slot() {
            let committed = EnrollmentRepository::scheduled_courses_in(&mut tx, student_id).await?;
            for row in &committed {
                let Some(held_slot) = row.slot() else { continue };
                if candidate.overlaps(&held_slot) {
                    return Self::reject(
                        tx,
                        EnrollError::TimeConflict {
                            course_name: row.course_name.clone(),
                        },
                    )
                    .await;
                }
            }
        }

        let prerequisites =
            CourseRepository::prerequisites_in(&mut tx, &details.offering.course_id).await?;
        for prerequisite in &prerequisites {
            let passed = EnrollmentRepository::has_passed_course_in(
                &mut tx,
                student_id,
                &prerequisite.course_id,
            )
            .await?;
            if !passed {
                return Self::reject(
                    tx,
                    EnrollError::PrerequisiteNotMet {
                        course_name: prerequisite.name.clone(),
                    },
                )
                .await;
            }
        }

        EnrollmentRepository::insert_in(&mut tx, offering_id, student_id, Utc::now()).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(
            student_id = %student_id,
            offering_id = %offering_id,
            course = %details.course_name,
            "Enrolled"
        );

        Ok(EnrollmentConfirmation {
            enrollment_id: Enrollment::compose_id(offering_id, student_id),
            offering_id: offering_id.to_string(),
            course_name: details.course_name,
            teacher_name: details.teacher_name,
            current_students: details.offering.current_students + 1,
            max_students: details.offering.max_students,
        })
    }

    /// Drops an ungraded enrollment and gives the seat back.
    ///
    /// ## Errors
    /// - `OfferingNotFound` / `EnrollmentNotFound` when either side is missing
    /// - `NotDroppable` once a score is recorded; graded rows are permanent
    pub async fn drop_course(
        &self,
        student_id: &str,
        offering_id: &str,
    ) -> EngineResult<DropConfirmation> {
        validation::validate_id("student_id", student_id).map_err(EnrollError::from)?;
        validation::validate_id("offering_id", offering_id).map_err(EnrollError::from)?;

        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        let mut tx = conn
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;

        let Some(details) = OfferingRepository::details_in(&mut tx, offering_id).await? else {
            return Self::reject(tx, EnrollError::OfferingNotFound(offering_id.to_string())).await;
        };

        let Some(enrollment) = EnrollmentRepository::find_in(&mut tx, offering_id, student_id).await?
        else {
            return Self::reject(
                tx,
                EnrollError::EnrollmentNotFound {
                    student_id: student_id.to_string(),
                    offering_id: offering_id.to_string(),
                },
            )
            .await;
        };

        if enrollment.is_graded() {
            return Self::reject(
                tx,
                EnrollError::NotDroppable {
                    offering_id: offering_id.to_string(),
                },
            )
            .await;
        }

        EnrollmentRepository::delete_in(&mut tx, offering_id, student_id).await?;
        OfferingRepository::release_seat(&mut tx, offering_id).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(
            student_id = %student_id,
            offering_id = %offering_id,
            course = %details.course_name,
            "Dropped"
        );

        Ok(DropConfirmation {
            offering_id: offering_id.to_string(),
            course_name: details.course_name,
        })
    }

    /// Records scores for an offering's roster and moves the credit ledger.
    ///
    /// Each entry runs in its own immediate-mode transaction: a skipped or
    /// failed entry never rolls back its neighbors. Entries referencing
    /// students with no enrollment here, or carrying an out-of-range score,
    /// are recorded as skips rather than raised. A duplicated student id
    /// within one batch is last-write-wins.
    ///
    /// Credit movement follows the pass-state transition, so resubmitting an
    /// unchanged score moves nothing.
    ///
    /// ## Errors
    /// - `OfferingNotFound` if the offering does not exist
    /// - `EngineError::Storage` aborts the remainder of the batch; entries
    ///   already committed stay committed
    pub async fn submit_grades(
        &self,
        offering_id: &str,
        entries: &[GradeEntry],
    ) -> EngineResult<GradeBatchSummary> {
        validation::validate_id("offering_id", offering_id).map_err(EnrollError::from)?;

        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;

        let Some(details) = OfferingRepository::details_in(&mut conn, offering_id).await? else {
            return Err(EnrollError::OfferingNotFound(offering_id.to_string()).into());
        };
        let course_credits = Credits::from_tenths(details.credit_tenths);

        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            if validation::validate_score(entry.score).is_err() {
                warn!(
                    student_id = %entry.student_id,
                    score = entry.score,
                    "Skipping grade entry with out-of-range score"
                );
                outcomes.push(GradeOutcome::SkippedInvalidScore {
                    student_id: entry.student_id.clone(),
                    score: entry.score,
                });
                continue;
            }

            let mut tx = conn
                .begin_with("BEGIN IMMEDIATE")
                .await
                .map_err(DbError::from)?;

            let Some(enrollment) =
                EnrollmentRepository::find_in(&mut tx, offering_id, &entry.student_id).await?
            else {
                tx.rollback().await.map_err(DbError::from)?;
                warn!(
                    student_id = %entry.student_id,
                    offering_id = %offering_id,
                    "Skipping grade entry for student not enrolled here"
                );
                outcomes.push(GradeOutcome::SkippedNotEnrolled {
                    student_id: entry.student_id.clone(),
                });
                continue;
            };

            let old_score = enrollment.score;
            EnrollmentRepository::set_score_in(&mut tx, offering_id, &entry.student_id, entry.score)
                .await?;

            // Old score and overwrite live in one transaction, which is what
            // makes regrading idempotent on the ledger
            let delta = grading::credit_delta(old_score, Some(entry.score), course_credits);
            if !delta.is_zero() {
                StudentRepository::adjust_credits(&mut tx, &entry.student_id, delta).await?;
            }

            tx.commit().await.map_err(DbError::from)?;
            outcomes.push(GradeOutcome::Updated {
                student_id: entry.student_id.clone(),
                old_score,
                new_score: entry.score,
            });
        }

        let updated_count = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, GradeOutcome::Updated { .. }))
            .count() as i64;

        info!(
            offering_id = %offering_id,
            updated = updated_count,
            submitted = entries.len(),
            "Grade batch processed"
        );

        Ok(GradeBatchSummary {
            offering_id: offering_id.to_string(),
            updated_count,
            outcomes,
        })
    }

    /// A student's timetable across every term, weekday order.
    ///
    /// An unknown student simply has an empty schedule; reads are lenient.
    pub async fn get_schedule(&self, student_id: &str) -> EngineResult<Vec<ScheduleEntry>> {
        let rows = EnrollmentRepository::new(self.pool.clone())
            .schedule_for_student(student_id)
            .await?;

        Ok(rows.into_iter().map(ScheduleEntry::from).collect())
    }

    /// A term's catalog as one student sees it: sections of courses the
    /// student already holds are filtered out, the rest carry seat counts
    /// and an availability flag.
    pub async fn available_offerings(
        &self,
        student_id: &str,
        academic_year: &str,
        semester: Semester,
    ) -> EngineResult<Vec<AvailableOffering>> {
        let rows = OfferingRepository::new(self.pool.clone())
            .browse_for_term(academic_year, semester, student_id)
            .await?;

        Ok(rows.into_iter().map(AvailableOffering::from).collect())
    }

    /// A student's graded history with ledger total and weighted average.
    ///
    /// ## Errors
    /// - `StudentNotFound` if the student does not exist; the transcript
    ///   quotes the stored credit ledger, so there must be one
    pub async fn transcript(&self, student_id: &str) -> EngineResult<Transcript> {
        let Some(student) = StudentRepository::new(self.pool.clone())
            .get(student_id)
            .await?
        else {
            return Err(EnrollError::StudentNotFound(student_id.to_string()).into());
        };

        let rows = EnrollmentRepository::new(self.pool.clone())
            .transcript_rows(student_id)
            .await?;

        // Failed courses appear as entries but never weigh into the average
        let weighted_average = grading::weighted_average(
            rows.iter()
                .filter(|row| grading::is_passing(Some(row.score)))
                .map(|row| (row.score, Credits::from_tenths(row.credit_tenths))),
        );

        let entries = rows
            .into_iter()
            .map(|row| TranscriptEntry {
                passed: grading::is_passing(Some(row.score)),
                course_id: row.course_id,
                course_name: row.course_name,
                credits: Credits::from_tenths(row.credit_tenths),
                academic_year: row.academic_year,
                semester: row.semester,
                teacher_name: row.teacher_name,
                score: row.score,
            })
            .collect();

        let total_credits = student.total_credits();
        Ok(Transcript {
            student_id: student.student_id,
            student_name: student.name,
            entries,
            total_credits,
            weighted_average,
        })
    }

    /// Rolls back and surfaces a rule rejection.
    ///
    /// Rollback failure wins over the rejection: the caller must know the
    /// database may not have unwound.
    async fn reject<T>(tx: Transaction<'_, Sqlite>, error: EnrollError) -> EngineResult<T> {
        tx.rollback().await.map_err(DbError::from)?;
        debug!(reason = %error, "Request rejected");
        Err(EngineError::Rule(error))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
