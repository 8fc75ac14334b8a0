use actix_session::Session;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::user::{self, User};

const USER_ID_KEY: &str = "user_id";

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>(USER_ID_KEY).unwrap_or(None)
}

pub fn set_user_id(session: &Session, user_id: i64) -> Result<(), AppError> {
    session
        .insert(USER_ID_KEY, user_id)
        .map_err(|e| AppError::Session(e.to_string()))
}

pub fn clear(session: &Session) {
    session.purge();
}

/// Load the session user fresh from the database. Role checks must always go
/// through this rather than trusting anything cached client-side: a user may
/// have been promoted, demoted, or deleted since login.
pub fn current_user(session: &Session, pool: &DbPool) -> Result<User, AppError> {
    let user_id = get_user_id(session).ok_or(AppError::Unauthorized)?;
    let conn = pool.get()?;
    user::find_by_id(&conn, user_id)?.ok_or(AppError::Unauthorized)
}
