use chrono::Weekday;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

pub const WEEKDAYS: [&str; 7] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Lowercase column value for a chrono weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize]
}

#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub id: i64,
    pub course: String,
    pub weekday: String,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleInput {
    pub course: String,
    pub weekday: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub description: String,
}

fn row_to_schedule(row: &rusqlite::Row) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        id: row.get("id")?,
        course: row.get("course")?,
        weekday: row.get("weekday")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        description: row.get("description")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

const SELECT_SCHEDULE: &str = "SELECT id, course, weekday, start_time, end_time, \
     description, created_by, created_at, updated_at FROM schedules";

/// All entries ordered by weekday (Monday first) then start time.
pub fn list(conn: &Connection) -> rusqlite::Result<Vec<Schedule>> {
    let sql = format!(
        "{SELECT_SCHEDULE} ORDER BY CASE weekday \
           WHEN 'monday' THEN 0 WHEN 'tuesday' THEN 1 WHEN 'wednesday' THEN 2 \
           WHEN 'thursday' THEN 3 WHEN 'friday' THEN 4 WHEN 'saturday' THEN 5 \
           ELSE 6 END, start_time"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_schedule)?.collect();
    rows
}

/// Entries for one weekday, ordered by start time.
pub fn list_for_weekday(conn: &Connection, weekday: &str) -> rusqlite::Result<Vec<Schedule>> {
    let sql = format!("{SELECT_SCHEDULE} WHERE weekday = ?1 ORDER BY start_time");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![weekday], row_to_schedule)?.collect();
    rows
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Schedule>> {
    let sql = format!("{SELECT_SCHEDULE} WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_schedule)?;
    rows.next().transpose()
}

/// Distinct course names, for task forms.
pub fn course_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT course FROM schedules ORDER BY course")?;
    let rows = stmt.query_map([], |row| row.get(0))?.collect();
    rows
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM schedules", [], |row| row.get(0))
}

pub fn create(conn: &Connection, input: &ScheduleInput, created_by: i64) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO schedules (course, weekday, start_time, end_time, description, created_by) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input.course.trim(),
            input.weekday,
            input.start_time,
            input.end_time,
            input.description.trim(),
            created_by
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, input: &ScheduleInput) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE schedules SET course = ?1, weekday = ?2, start_time = ?3, end_time = ?4, \
         description = ?5, updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now') WHERE id = ?6",
        params![
            input.course.trim(),
            input.weekday,
            input.start_time,
            input.end_time,
            input.description.trim(),
            id
        ],
    )
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM schedules WHERE id = ?1", params![id])
}
