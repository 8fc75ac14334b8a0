use rusqlite::{Connection, params};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: String,
}

fn row_to_notification(row: &rusqlite::Row) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        message: row.get("message")?,
        kind: row.get("kind")?,
        is_read: row.get::<_, i64>("is_read")? != 0,
        created_at: row.get("created_at")?,
    })
}

const SELECT_NOTIFICATION: &str =
    "SELECT id, user_id, title, message, kind, is_read, created_at FROM notifications";

pub fn create(
    conn: &Connection,
    user_id: i64,
    title: &str,
    message: &str,
    kind: &str,
) -> rusqlite::Result<Notification> {
    conn.execute(
        "INSERT INTO notifications (user_id, title, message, kind) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, title, message, kind],
    )?;
    let id = conn.last_insert_rowid();
    find_by_id(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Insert the same notification for many users (task fan-out).
pub fn create_for_users(
    conn: &Connection,
    user_ids: &[i64],
    title: &str,
    message: &str,
    kind: &str,
) -> rusqlite::Result<Vec<Notification>> {
    user_ids
        .iter()
        .map(|&uid| create(conn, uid, title, message, kind))
        .collect()
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Notification>> {
    let sql = format!("{SELECT_NOTIFICATION} WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_notification)?;
    rows.next().transpose()
}

/// Latest notifications for one user, newest first.
pub fn list_for_user(conn: &Connection, user_id: i64, limit: i64) -> rusqlite::Result<Vec<Notification>> {
    let sql = format!(
        "{SELECT_NOTIFICATION} WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, limit], row_to_notification)?.collect();
    rows
}

pub fn count_unread(conn: &Connection, user_id: i64) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
        params![user_id],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Mark one notification read; scoped to the owner so a user cannot touch
/// another account's rows.
pub fn mark_read(conn: &Connection, id: i64, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )
}

pub fn mark_all_read(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
        params![user_id],
    )
}

pub fn delete(conn: &Connection, id: i64, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM notifications WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )
}
