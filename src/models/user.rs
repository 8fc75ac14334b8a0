use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// The three account roles. The approval relation between them is not a
/// ranking; see `auth::policy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "member" => Some(Role::Member),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

/// Internal user struct for authentication — includes the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub student_id: String,
    pub password: String,
    pub role: Role,
    pub created_at: String,
}

/// Safe version for API responses — no password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserDisplay {
    pub id: i64,
    pub full_name: String,
    pub student_id: String,
    pub role: Role,
    pub created_at: String,
}

impl From<User> for UserDisplay {
    fn from(u: User) -> Self {
        UserDisplay {
            id: u.id,
            full_name: u.full_name,
            student_id: u.student_id,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

pub struct NewUser {
    pub full_name: String,
    pub student_id: String,
    /// Already hashed by the caller.
    pub password: String,
}

/// Per-role account counts for the user management view.
#[derive(Debug, Default, Serialize)]
pub struct RoleCounts {
    pub total: i64,
    pub members: i64,
    pub admins: i64,
    pub super_admins: i64,
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let role_str: String = row.get("role")?;
    Ok(User {
        id: row.get("id")?,
        full_name: row.get("full_name")?,
        student_id: row.get("student_id")?,
        password: row.get("password")?,
        role: Role::parse(&role_str).unwrap_or(Role::Member),
        created_at: row.get("created_at")?,
    })
}

const SELECT_USER: &str =
    "SELECT id, full_name, student_id, password, role, created_at FROM users";

/// Insert a new member account. A duplicate student id surfaces as a typed
/// `Conflict`, never as message-text matching downstream.
pub fn create(conn: &Connection, new_user: &NewUser) -> Result<i64, AppError> {
    let result = conn.execute(
        "INSERT INTO users (full_name, student_id, password) VALUES (?1, ?2, ?3)",
        params![new_user.full_name, new_user.student_id, new_user.password],
    );
    match result {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(e, msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            log::debug!("User insert constraint violation: {msg:?}");
            Err(AppError::Conflict("student id already registered".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    let mut stmt = conn.prepare(&format!("{SELECT_USER} WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id], row_to_user)?;
    rows.next().transpose()
}

pub fn find_by_student_id(conn: &Connection, student_id: &str) -> rusqlite::Result<Option<User>> {
    let mut stmt = conn.prepare(&format!("{SELECT_USER} WHERE student_id = ?1"))?;
    let mut rows = stmt.query_map(params![student_id], row_to_user)?;
    rows.next().transpose()
}

/// List all accounts, newest first, optionally filtered by a search term
/// matched against name and student id.
pub fn list(conn: &Connection, search: Option<&str>) -> rusqlite::Result<Vec<UserDisplay>> {
    let rows = match search.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            let sql = format!(
                "{SELECT_USER} WHERE full_name LIKE ?1 OR student_id LIKE ?1 \
                 ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let pattern = format!("%{q}%");
            let users = stmt.query_map(params![pattern], row_to_user)?
                .collect::<Result<Vec<_>, _>>()?;
            users
        }
        None => {
            let sql = format!("{SELECT_USER} ORDER BY created_at DESC, id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let users = stmt.query_map([], row_to_user)?
                .collect::<Result<Vec<_>, _>>()?;
            users
        }
    };

    Ok(rows.into_iter().map(UserDisplay::from).collect())
}

pub fn count_by_role(conn: &Connection, role: Role) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role = ?1",
        params![role.as_str()],
        |row| row.get(0),
    )
}

pub fn role_counts(conn: &Connection) -> rusqlite::Result<RoleCounts> {
    Ok(RoleCounts {
        total: conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?,
        members: count_by_role(conn, Role::Member)?,
        admins: count_by_role(conn, Role::Admin)?,
        super_admins: count_by_role(conn, Role::SuperAdmin)?,
    })
}

/// Write a role change. Callers are responsible for the policy checks;
/// this only performs the update.
pub fn update_role(conn: &Connection, user_id: i64, role: Role) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users SET role = ?1 WHERE id = ?2",
        params![role.as_str(), user_id],
    )
}
