//! Shared fixtures for crate tests: databases and a small seeded catalog.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::pool::{Database, DbConfig};
use crate::repository::offering::NewOffering;
use registrar_core::{ClockTime, Course, CourseOffering, Semester, Student, Teacher, WeeklySlot};

static TEMP_DB_SEQ: AtomicU32 = AtomicU32::new(0);

/// In-memory database, migrated. One connection, so writers run strictly in
/// sequence; use [`TempDb`] for anything exercising concurrency.
pub(crate) async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// A file-backed database under the system temp dir, removed on drop.
///
/// In-memory SQLite lives inside a single connection, which serializes every
/// caller ahead of the lock we want to exercise. Concurrency tests need a
/// real file and a real pool.
pub(crate) struct TempDb {
    pub db: Database,
    path: PathBuf,
}

impl TempDb {
    pub(crate) async fn new() -> Self {
        let seq = TEMP_DB_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "registrar-test-{}-{}.db",
            std::process::id(),
            seq
        ));
        let _ = std::fs::remove_file(&path);
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        TempDb { db, path }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = std::fs::remove_file(self.path.with_extension("db-wal"));
        let _ = std::fs::remove_file(self.path.with_extension("db-shm"));
    }
}

pub(crate) fn course(id: &str, name: &str, credit_tenths: i64) -> Course {
    let now = Utc::now();
    Course {
        course_id: id.to_string(),
        name: name.to_string(),
        credit_tenths,
        weekly_hours: 3,
        has_exam: true,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn teacher(id: &str, name: &str) -> Teacher {
    let now = Utc::now();
    Teacher {
        teacher_id: id.to_string(),
        name: name.to_string(),
        title: "Professor".to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn student(id: &str, name: &str) -> Student {
    let now = Utc::now();
    Student {
        student_id: id.to_string(),
        name: name.to_string(),
        credit_tenths: 0,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn slot(day: u8, start: (u16, u16), end: (u16, u16)) -> WeeklySlot {
    WeeklySlot::new(
        day,
        ClockTime::from_hm(start.0, start.1).unwrap(),
        ClockTime::from_hm(end.0, end.1).unwrap(),
    )
    .unwrap()
}

/// The catalog most tests start from:
/// CS101 (4.0 credits), CS102 (3.0, requires CS101), MA101 (3.5);
/// teachers T001/T002; students S001/S002/S003.
pub(crate) async fn seed_catalog(db: &Database) {
    for c in [
        course("CS101", "Data Structures", 40),
        course("CS102", "Algorithm Design", 30),
        course("MA101", "Linear Algebra", 35),
    ] {
        db.courses().insert(&c).await.unwrap();
    }
    db.courses().add_prerequisite("CS102", "CS101").await.unwrap();

    for t in [teacher("T001", "Alice Chen"), teacher("T002", "Brian Osei")] {
        db.teachers().insert(&t).await.unwrap();
    }

    for s in [
        student("S001", "Evan Park"),
        student("S002", "Fatima Noor"),
        student("S003", "Grace Liu"),
    ] {
        db.students().insert(&s).await.unwrap();
    }
}

/// Creates a 2024 offering for the given term.
pub(crate) async fn create_offering(
    db: &Database,
    course_id: &str,
    teacher_id: &str,
    semester: Semester,
    max_students: i64,
    slot: Option<WeeklySlot>,
) -> CourseOffering {
    db.offerings()
        .create(NewOffering {
            course_id: course_id.to_string(),
            teacher_id: teacher_id.to_string(),
            academic_year: "2024".to_string(),
            semester,
            max_students,
            slot,
            location: None,
        })
        .await
        .unwrap()
}
