//! # Repository Module
//!
//! Database repository implementations for the enrollment ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Host surface / EnrollmentEngine                                       │
//! │       │                                                                 │
//! │       │  db.offerings().get("2024-1-CS101-T001")                       │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  OfferingRepository                                                    │
//! │  ├── get(&self, offering_id)            ← pool methods: one statement  │
//! │  ├── create(&self, new_offering)                                       │
//! │  └── reserve_seat(conn, offering_id)    ← conn methods: composed into  │
//! │       │                                    engine transactions         │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Kinds of Methods
//!
//! Methods taking `&self` run one statement against the pool. Associated
//! functions taking `&mut SqliteConnection` are building blocks the
//! [`EnrollmentEngine`](crate::engine::EnrollmentEngine) sequences inside a
//! single transaction; they never commit on their own.
//!
//! ## Available Repositories
//!
//! - [`course::CourseRepository`] - Catalog and prerequisite edges
//! - [`teacher::TeacherRepository`] - Staff records
//! - [`student::StudentRepository`] - Student records and credit totals
//! - [`offering::OfferingRepository`] - Sections, seat counters, lifecycle
//! - [`enrollment::EnrollmentRepository`] - Enrollment rows and score lookups
//! - [`report::ReportRepository`] - Occupancy and conflict reporting

pub mod course;
pub mod enrollment;
pub mod offering;
pub mod report;
pub mod student;
pub mod teacher;
