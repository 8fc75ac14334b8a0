use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub course: String,
    pub deadline: String,
    pub description: String,
    pub created_by: Option<i64>,
    pub creator_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskInput {
    pub course: String,
    /// RFC 3339 timestamp.
    pub deadline: String,
    #[serde(default)]
    pub description: String,
}

/// Per-user completion state for one task. Toggled freely between pending
/// and completed; neither state is terminal.
#[derive(Debug, Clone, Serialize)]
pub struct TaskCompletion {
    pub id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub status: String,
    pub completed_at: Option<String>,
}

/// Completion tallies per task, for admin oversight.
#[derive(Debug, Serialize)]
pub struct TaskStats {
    pub task_id: i64,
    pub completed_count: i64,
    pub eligible_count: i64,
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        course: row.get("course")?,
        deadline: row.get("deadline")?,
        description: row.get("description")?,
        created_by: row.get("created_by")?,
        creator_name: row.get("creator_name")?,
        created_at: row.get("created_at")?,
    })
}

const SELECT_TASK: &str = "SELECT t.id, t.course, t.deadline, t.description, t.created_by, \
     u.full_name AS creator_name, t.created_at \
     FROM tasks t LEFT JOIN users u ON u.id = t.created_by";

/// All tasks, earliest deadline first.
pub fn list(conn: &Connection) -> rusqlite::Result<Vec<Task>> {
    let sql = format!("{SELECT_TASK} ORDER BY t.deadline");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_task)?.collect();
    rows
}

/// Tasks with a deadline at or after `now`, earliest first, capped at `limit`.
pub fn list_upcoming(conn: &Connection, now: &str, limit: i64) -> rusqlite::Result<Vec<Task>> {
    let sql = format!("{SELECT_TASK} WHERE t.deadline >= ?1 ORDER BY t.deadline LIMIT ?2");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![now, limit], row_to_task)?.collect();
    rows
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Task>> {
    let sql = format!("{SELECT_TASK} WHERE t.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], row_to_task)?;
    rows.next().transpose()
}

pub fn count_active(conn: &Connection, now: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM tasks WHERE deadline >= ?1",
        params![now],
        |row| row.get(0),
    )
}

pub fn create(conn: &Connection, input: &TaskInput, created_by: i64) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO tasks (course, deadline, description, created_by) VALUES (?1, ?2, ?3, ?4)",
        params![input.course.trim(), input.deadline, input.description.trim(), created_by],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, input: &TaskInput) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE tasks SET course = ?1, deadline = ?2, description = ?3 WHERE id = ?4",
        params![input.course.trim(), input.deadline, input.description.trim(), id],
    )
}

/// Completion rows cascade via the foreign key.
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])
}

// ---------------------------------------------------------------------------
// Completions

fn row_to_completion(row: &rusqlite::Row) -> rusqlite::Result<TaskCompletion> {
    Ok(TaskCompletion {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        user_id: row.get("user_id")?,
        status: row.get("status")?,
        completed_at: row.get("completed_at")?,
    })
}

/// All completion rows for one user.
pub fn completions_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<TaskCompletion>> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, user_id, status, completed_at \
         FROM task_completions WHERE user_id = ?1",
    )?;
    let rows = stmt.query_map(params![user_id], row_to_completion)?.collect();
    rows
}

pub fn find_completion(
    conn: &Connection,
    task_id: i64,
    user_id: i64,
) -> rusqlite::Result<Option<TaskCompletion>> {
    conn.query_row(
        "SELECT id, task_id, user_id, status, completed_at \
         FROM task_completions WHERE task_id = ?1 AND user_id = ?2",
        params![task_id, user_id],
        row_to_completion,
    )
    .optional()
}

/// Flip the completion state for (task, user): pending becomes completed
/// with `completed_at` stamped, completed becomes pending with it cleared.
/// Upsert keyed on the composite pair; returns the new state.
pub fn toggle_completion(
    conn: &Connection,
    task_id: i64,
    user_id: i64,
    now: &str,
) -> rusqlite::Result<TaskCompletion> {
    let current = find_completion(conn, task_id, user_id)?;
    let completing = !matches!(current, Some(ref c) if c.status == "completed");
    let completed_at = completing.then(|| now.to_string());
    let status = if completing { "completed" } else { "pending" };

    conn.execute(
        "INSERT INTO task_completions (task_id, user_id, status, completed_at) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT (task_id, user_id) DO UPDATE SET status = ?3, completed_at = ?4",
        params![task_id, user_id, status, completed_at],
    )?;

    find_completion(conn, task_id, user_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Completed counts per task against the number of accounts that can
/// complete tasks (members and admins).
pub fn completion_stats(conn: &Connection) -> rusqlite::Result<Vec<TaskStats>> {
    let eligible: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role IN ('member', 'admin')",
        [],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT t.id, COUNT(tc.id) AS completed_count \
         FROM tasks t \
         LEFT JOIN task_completions tc ON tc.task_id = t.id AND tc.status = 'completed' \
         GROUP BY t.id ORDER BY t.deadline",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(TaskStats {
            task_id: row.get(0)?,
            completed_count: row.get(1)?,
            eligible_count: eligible,
        })
    })?
    .collect();
    rows
}
