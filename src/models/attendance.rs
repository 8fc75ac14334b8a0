use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::Role;

/// Attendance record lifecycle: pending until an authorized approver
/// decides; approved and rejected are both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Pending,
    Approved,
    Rejected,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Pending => "pending",
            AttendanceStatus::Approved => "approved",
            AttendanceStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<AttendanceStatus> {
        match s {
            "pending" => Some(AttendanceStatus::Pending),
            "approved" => Some(AttendanceStatus::Approved),
            "rejected" => Some(AttendanceStatus::Rejected),
            _ => None,
        }
    }
}

/// Attendance row joined with submitter, schedule, and approver info —
/// the shape the list view and the export consume.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_student_id: String,
    pub user_role: Role,
    pub schedule_id: i64,
    pub course: String,
    pub date: String,
    pub status: AttendanceStatus,
    pub approved_by: Option<i64>,
    pub approver_name: Option<String>,
    pub approved_at: Option<String>,
    pub created_at: String,
}

/// Bare (date, status) pair for the weekly aggregation.
#[derive(Debug, Clone)]
pub struct DatedStatus {
    pub date: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Default)]
pub struct ListFilter {
    /// Restrict to one submitter (role scoping for members).
    pub user_id: Option<i64>,
    pub date: Option<String>,
    pub status: Option<AttendanceStatus>,
    pub offset: i64,
    pub limit: Option<i64>,
}

/// Status tallies over a filtered listing (ignoring pagination).
#[derive(Debug, Default, Serialize)]
pub struct StatusCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<AttendanceRecord> {
    let role_str: String = row.get("user_role")?;
    let status_str: String = row.get("status")?;
    Ok(AttendanceRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        user_name: row.get("user_name")?,
        user_student_id: row.get("user_student_id")?,
        user_role: Role::parse(&role_str).unwrap_or(Role::Member),
        schedule_id: row.get("schedule_id")?,
        course: row.get("course")?,
        date: row.get("date")?,
        status: AttendanceStatus::parse(&status_str).unwrap_or(AttendanceStatus::Pending),
        approved_by: row.get("approved_by")?,
        approver_name: row.get("approver_name")?,
        approved_at: row.get("approved_at")?,
        created_at: row.get("created_at")?,
    })
}

const SELECT_RECORD: &str = "SELECT a.id, a.user_id, u.full_name AS user_name, \
     u.student_id AS user_student_id, u.role AS user_role, \
     a.schedule_id, s.course, a.date, a.status, \
     a.approved_by, ap.full_name AS approver_name, a.approved_at, a.created_at \
     FROM attendance a \
     JOIN users u ON u.id = a.user_id \
     JOIN schedules s ON s.id = a.schedule_id \
     LEFT JOIN users ap ON ap.id = a.approved_by";

fn filter_clause(filter: &ListFilter) -> (String, Vec<rusqlite::types::Value>) {
    let mut clauses = Vec::new();
    let mut params_vec: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(user_id) = filter.user_id {
        params_vec.push(rusqlite::types::Value::Integer(user_id));
        clauses.push(format!("a.user_id = ?{}", params_vec.len()));
    }
    if let Some(ref date) = filter.date {
        params_vec.push(rusqlite::types::Value::Text(date.clone()));
        clauses.push(format!("a.date = ?{}", params_vec.len()));
    }
    if let Some(status) = filter.status {
        params_vec.push(rusqlite::types::Value::Text(status.as_str().to_string()));
        clauses.push(format!("a.status = ?{}", params_vec.len()));
    }

    let where_clause = if clauses.is_empty() {
        "1=1".to_string()
    } else {
        clauses.join(" AND ")
    };
    (where_clause, params_vec)
}

/// Filtered listing, newest submission first.
pub fn list(conn: &Connection, filter: &ListFilter) -> rusqlite::Result<Vec<AttendanceRecord>> {
    let (where_clause, mut params_vec) = filter_clause(filter);
    let mut sql = format!("{SELECT_RECORD} WHERE {where_clause} ORDER BY a.created_at DESC, a.id DESC");

    if let Some(limit) = filter.limit {
        params_vec.push(rusqlite::types::Value::Integer(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));
        params_vec.push(rusqlite::types::Value::Integer(filter.offset));
        sql.push_str(&format!(" OFFSET ?{}", params_vec.len()));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), row_to_record)?
        .collect();
    rows
}

/// Oldest-first listing of every record visible to the requester; feeds the
/// spreadsheet export.
pub fn list_for_export(conn: &Connection, user_id: Option<i64>) -> rusqlite::Result<Vec<AttendanceRecord>> {
    let filter = ListFilter { user_id, ..Default::default() };
    let (where_clause, params_vec) = filter_clause(&filter);
    let sql = format!("{SELECT_RECORD} WHERE {where_clause} ORDER BY a.date, a.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), row_to_record)?
        .collect();
    rows
}

/// Status tallies for the same filter as `list`, ignoring pagination.
pub fn status_counts(conn: &Connection, filter: &ListFilter) -> rusqlite::Result<StatusCounts> {
    let unpaged = ListFilter {
        user_id: filter.user_id,
        date: filter.date.clone(),
        status: filter.status,
        ..Default::default()
    };
    let (where_clause, params_vec) = filter_clause(&unpaged);
    let sql = format!(
        "SELECT COUNT(*), \
           COALESCE(SUM(a.status = 'pending'), 0), \
           COALESCE(SUM(a.status = 'approved'), 0), \
           COALESCE(SUM(a.status = 'rejected'), 0) \
         FROM attendance a WHERE {where_clause}"
    );
    conn.query_row(&sql, rusqlite::params_from_iter(params_vec.iter()), |row| {
        Ok(StatusCounts {
            total: row.get(0)?,
            pending: row.get(1)?,
            approved: row.get(2)?,
            rejected: row.get(3)?,
        })
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<AttendanceRecord>> {
    let sql = format!("{SELECT_RECORD} WHERE a.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_record)?;
    rows.next().transpose()
}

/// Insert a pending submission. The (user, schedule, date) unique constraint
/// makes a double submission a typed conflict.
pub fn submit(conn: &Connection, user_id: i64, schedule_id: i64, date: &str) -> Result<i64, AppError> {
    let result = conn.execute(
        "INSERT INTO attendance (user_id, schedule_id, date) VALUES (?1, ?2, ?3)",
        params![user_id, schedule_id, date],
    );
    match result {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::Conflict("attendance already submitted for this class today".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Schedule ids the user already submitted for on `date`.
pub fn submitted_schedule_ids(conn: &Connection, user_id: i64, date: &str) -> rusqlite::Result<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT schedule_id FROM attendance WHERE user_id = ?1 AND date = ?2")?;
    let rows = stmt.query_map(params![user_id, date], |row| row.get(0))?.collect();
    rows
}

/// Record a decision. Only a pending row can transition; the guarded UPDATE
/// returns 0 rows for anything already decided.
pub fn decide(
    conn: &Connection,
    id: i64,
    status: AttendanceStatus,
    approver_id: i64,
    now: &str,
) -> Result<(), AppError> {
    debug_assert!(status != AttendanceStatus::Pending);
    let changed = conn.execute(
        "UPDATE attendance SET status = ?1, approved_by = ?2, approved_at = ?3 \
         WHERE id = ?4 AND status = 'pending'",
        params![status.as_str(), approver_id, now, id],
    )?;
    if changed == 0 {
        return Err(AppError::Conflict("attendance record already decided".to_string()));
    }
    Ok(())
}

/// Pending rows submitted by users of the given role — the count an
/// approver sees on their dashboard.
pub fn count_pending_by_submitter_role(conn: &Connection, role: Role) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM attendance a JOIN users u ON u.id = a.user_id \
         WHERE a.status = 'pending' AND u.role = ?1",
        params![role.as_str()],
        |row| row.get(0),
    )
}

pub fn count_pending_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM attendance WHERE user_id = ?1 AND status = 'pending'",
        params![user_id],
        |row| row.get(0),
    )
}

/// (date, status) pairs for one user with `date >= since` — the weekly
/// aggregation input.
pub fn dated_statuses_since(
    conn: &Connection,
    user_id: i64,
    since: &str,
) -> rusqlite::Result<Vec<DatedStatus>> {
    let mut stmt = conn.prepare(
        "SELECT date, status FROM attendance WHERE user_id = ?1 AND date >= ?2",
    )?;
    let rows = stmt.query_map(params![user_id, since], |row| {
        let status_str: String = row.get(1)?;
        Ok(DatedStatus {
            date: row.get(0)?,
            status: AttendanceStatus::parse(&status_str).unwrap_or(AttendanceStatus::Pending),
        })
    })?
    .collect();
    rows
}
