//! Shared test infrastructure for model layer tests.
//!
//! Provides a temporary SQLite database with the full schema applied plus
//! helpers for seeding accounts, schedules, and tasks.

use rusqlite::{Connection, params};
use tempfile::TempDir;

use abjar::db::MIGRATIONS;

pub const TEST_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGVzdHNhbHQ$fake";

/// Setup a test database with schema applied.
///
/// Returns a tuple of (TempDir, Connection) where TempDir must be kept
/// alive for the Connection to remain valid.
pub fn setup_test_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let conn = Connection::open(&db_path).expect("Failed to open test DB");

    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
        .expect("Failed to set pragmas");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");

    (dir, conn)
}

/// Insert a user with the given role and return its id. The stored password
/// is a fixed placeholder; tests that verify hashing create their own.
pub fn create_user(conn: &Connection, name: &str, student_id: &str, role: &str) -> i64 {
    conn.execute(
        "INSERT INTO users (full_name, student_id, password, role) VALUES (?1, ?2, ?3, ?4)",
        params![name, student_id, TEST_PASSWORD_HASH, role],
    )
    .expect("Failed to insert user");
    conn.last_insert_rowid()
}

pub fn create_member(conn: &Connection, name: &str, student_id: &str) -> i64 {
    create_user(conn, name, student_id, "member")
}

pub fn create_admin(conn: &Connection, name: &str, student_id: &str) -> i64 {
    create_user(conn, name, student_id, "admin")
}

pub fn create_super_admin(conn: &Connection) -> i64 {
    create_user(conn, "Super Admin", "00000000", "super_admin")
}

pub fn create_schedule(
    conn: &Connection,
    course: &str,
    weekday: &str,
    start_time: &str,
    end_time: &str,
    created_by: i64,
) -> i64 {
    conn.execute(
        "INSERT INTO schedules (course, weekday, start_time, end_time, description, created_by) \
         VALUES (?1, ?2, ?3, ?4, '', ?5)",
        params![course, weekday, start_time, end_time, created_by],
    )
    .expect("Failed to insert schedule");
    conn.last_insert_rowid()
}

pub fn create_task(conn: &Connection, course: &str, deadline: &str, created_by: i64) -> i64 {
    conn.execute(
        "INSERT INTO tasks (course, deadline, description, created_by) \
         VALUES (?1, ?2, 'bring materials', ?3)",
        params![course, deadline, created_by],
    )
    .expect("Failed to insert task");
    conn.last_insert_rowid()
}

/// Insert an attendance row directly, bypassing the time-window checks that
/// live in the handler layer.
pub fn insert_attendance(
    conn: &Connection,
    user_id: i64,
    schedule_id: i64,
    date: &str,
    status: &str,
) -> i64 {
    conn.execute(
        "INSERT INTO attendance (user_id, schedule_id, date, status) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, schedule_id, date, status],
    )
    .expect("Failed to insert attendance");
    conn.last_insert_rowid()
}
