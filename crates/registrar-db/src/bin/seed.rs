//! # Seed Data Generator
//!
//! Populates the database with a small course catalog for development and
//! walks the engine through its flows so the numbers on screen are real.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p registrar-db --bin seed
//!
//! # Specify database path
//! cargo run -p registrar-db --bin seed -- --db ./data/registrar.db
//!
//! # Engine logs
//! RUST_LOG=registrar_db=debug cargo run -p registrar-db --bin seed
//! ```
//!
//! ## Generated Catalog
//! - 6 courses with 2 prerequisite edges (CS102 and CS103 require CS101)
//! - 4 teachers, 5 students
//! - 7 offerings across both 2024 semesters, including two offerings of
//!   CS101 and a deliberate exact-slot collision for the conflict report
//!
//! The demo section then enrolls, rejects, grades and reports, printing
//! every outcome. Rejections marked ✗ are the engine working as intended.

use chrono::Utc;
use std::env;

use registrar_core::{ClockTime, Course, Semester, Student, Teacher, WeeklySlot};
use registrar_db::{Database, DbConfig, GradeEntry, NewOffering};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./registrar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Registrar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./registrar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🎓 Registrar Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing catalog
    let existing = db.courses().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} courses", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------
    println!();
    println!("Seeding catalog...");

    let courses = [
        course("CS101", "Data Structures", 40, 4, true),
        course("CS102", "Algorithm Design", 30, 3, true),
        course("CS103", "Database Systems", 40, 4, true),
        course("CS104", "Computer Networks", 30, 3, true),
        course("CS105", "Software Engineering", 30, 3, false),
        course("MA101", "Linear Algebra", 35, 3, true),
    ];
    for c in &courses {
        db.courses().insert(c).await?;
    }
    db.courses().add_prerequisite("CS102", "CS101").await?;
    db.courses().add_prerequisite("CS103", "CS101").await?;
    println!("  {} courses, 2 prerequisite edges", courses.len());

    let teachers = [
        teacher("T001", "Alice Chen", "Professor"),
        teacher("T002", "Brian Osei", "Associate Professor"),
        teacher("T003", "Carla Mendes", "Lecturer"),
        teacher("T004", "Dmitri Volkov", "Professor"),
    ];
    for t in &teachers {
        db.teachers().insert(t).await?;
    }

    let students = [
        student("S2023001", "Evan Park"),
        student("S2023002", "Fatima Noor"),
        student("S2023003", "Grace Liu"),
        student("S2023004", "Hugo Silva"),
        student("S2024001", "Iris Tanaka"),
    ];
    for s in &students {
        db.students().insert(s).await?;
    }
    println!("  {} teachers, {} students", teachers.len(), students.len());

    let cs101_a = db
        .offerings()
        .create(offering(
            "CS101",
            "T001",
            Semester::First,
            50,
            Some(slot(1, (8, 0), (9, 40))),
            "Hall A-101",
        ))
        .await?;
    let cs101_b = db
        .offerings()
        .create(offering(
            "CS101",
            "T002",
            Semester::First,
            40,
            Some(slot(2, (10, 0), (11, 40))),
            "Hall B-204",
        ))
        .await?;
    let cs104 = db
        .offerings()
        .create(offering(
            "CS104",
            "T003",
            Semester::First,
            2,
            Some(slot(3, (10, 0), (11, 40))),
            "Lab B-2",
        ))
        .await?;
    let _cs105 = db
        .offerings()
        .create(offering(
            "CS105",
            "T004",
            Semester::First,
            60,
            Some(slot(3, (14, 0), (15, 40))),
            "Lab C-3",
        ))
        .await?;
    // Same exact slot as CS101/T001: shows up in the conflict report
    let ma101 = db
        .offerings()
        .create(offering(
            "MA101",
            "T004",
            Semester::First,
            45,
            Some(slot(1, (8, 0), (9, 40))),
            "Hall A-102",
        ))
        .await?;
    let cs102_2 = db
        .offerings()
        .create(offering(
            "CS102",
            "T002",
            Semester::Second,
            40,
            Some(slot(4, (8, 0), (9, 40))),
            "Hall B-201",
        ))
        .await?;
    let _cs103_2 = db
        .offerings()
        .create(offering(
            "CS103",
            "T001",
            Semester::Second,
            40,
            Some(slot(5, (8, 0), (9, 40))),
            "Hall A-101",
        ))
        .await?;
    println!("  7 offerings across 2024");

    // -------------------------------------------------------------------------
    // Demo: the enroll pipeline, including the rejections
    // -------------------------------------------------------------------------
    println!();
    println!("Running demo enrollments (✗ lines are intended rejections)...");

    demo_enroll(&db, "S2023001", &cs101_a.offering_id).await;
    demo_enroll(&db, "S2023002", &cs101_a.offering_id).await;
    demo_enroll(&db, "S2023003", &cs101_b.offering_id).await;
    // Same course, other offering
    demo_enroll(&db, "S2023003", &cs101_a.offering_id).await;
    // Exact slot clash with the student's CS101 section
    demo_enroll(&db, "S2023001", &ma101.offering_id).await;
    // Two seats, then a third request
    demo_enroll(&db, "S2023004", &cs104.offering_id).await;
    demo_enroll(&db, "S2024001", &cs104.offering_id).await;
    demo_enroll(&db, "S2023001", &cs104.offering_id).await;
    // CS102 requires a passed CS101, not yet graded
    demo_enroll(&db, "S2023001", &cs102_2.offering_id).await;

    // -------------------------------------------------------------------------
    // Demo: grading and the credit ledger
    // -------------------------------------------------------------------------
    println!();
    println!("Submitting grades for {}...", cs101_a.offering_id);

    let entries = [
        GradeEntry {
            student_id: "S2023001".to_string(),
            score: 85,
        },
        GradeEntry {
            student_id: "S2023002".to_string(),
            score: 55,
        },
        // Not enrolled here; recorded as a skip
        GradeEntry {
            student_id: "S2024001".to_string(),
            score: 70,
        },
    ];
    let summary = db.engine().submit_grades(&cs101_a.offering_id, &entries).await?;
    println!(
        "  {} of {} entries updated",
        summary.updated_count,
        summary.outcomes.len()
    );

    // The prerequisite is satisfied now
    demo_enroll(&db, "S2023001", &cs102_2.offering_id).await;

    let transcript = db.engine().transcript("S2023001").await?;
    match transcript.weighted_average {
        Some(avg) => println!(
            "  {}: {} credits earned, weighted average {:.1}",
            transcript.student_name, transcript.total_credits, avg
        ),
        None => println!(
            "  {}: {} credits earned, nothing graded yet",
            transcript.student_name, transcript.total_credits
        ),
    }

    // -------------------------------------------------------------------------
    // Demo: reporting
    // -------------------------------------------------------------------------
    println!();
    println!("Conflict report for 2024 / first semester...");

    let report = db.reports().conflict_report("2024", Semester::First).await?;
    println!(
        "  {} scheduled offerings over {} distinct slots",
        report.scheduled_count, report.unique_slot_count
    );
    for group in &report.conflicts {
        let names: Vec<&str> = group
            .offerings
            .iter()
            .map(|o| o.course_name.as_str())
            .collect();
        println!("  ⚠ {}: {}", group.label(), names.join(", "));
    }

    let stats = db
        .reports()
        .enrollment_statistics(Some("2024"), Some(Semester::First))
        .await?;
    println!(
        "  Occupancy: {}/{} seats across {} offerings ({:.1}%)",
        stats.total_enrolled,
        stats.total_capacity,
        stats.total_offerings,
        stats.occupancy_rate * 100.0
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Enrolls and prints the outcome either way.
async fn demo_enroll(db: &Database, student_id: &str, offering_id: &str) {
    match db.engine().enroll(student_id, offering_id).await {
        Ok(c) => println!(
            "  ✓ {} → {} [{}/{}]",
            student_id, c.course_name, c.current_students, c.max_students
        ),
        Err(e) => println!("  ✗ {} → {}: {}", student_id, offering_id, e),
    }
}

fn course(id: &str, name: &str, credit_tenths: i64, weekly_hours: i64, has_exam: bool) -> Course {
    let now = Utc::now();
    Course {
        course_id: id.to_string(),
        name: name.to_string(),
        credit_tenths,
        weekly_hours,
        has_exam,
        created_at: now,
        updated_at: now,
    }
}

fn teacher(id: &str, name: &str, title: &str) -> Teacher {
    let now = Utc::now();
    Teacher {
        teacher_id: id.to_string(),
        name: name.to_string(),
        title: title.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn student(id: &str, name: &str) -> Student {
    let now = Utc::now();
    Student {
        student_id: id.to_string(),
        name: name.to_string(),
        credit_tenths: 0,
        created_at: now,
        updated_at: now,
    }
}

fn offering(
    course_id: &str,
    teacher_id: &str,
    semester: Semester,
    max_students: i64,
    slot: Option<WeeklySlot>,
    location: &str,
) -> NewOffering {
    NewOffering {
        course_id: course_id.to_string(),
        teacher_id: teacher_id.to_string(),
        academic_year: "2024".to_string(),
        semester,
        max_students,
        slot,
        location: Some(location.to_string()),
    }
}

fn slot(day: u8, start: (u16, u16), end: (u16, u16)) -> WeeklySlot {
    WeeklySlot::new(
        day,
        ClockTime::from_hm(start.0, start.1).unwrap(),
        ClockTime::from_hm(end.0, end.1).unwrap(),
    )
    .unwrap()
}
