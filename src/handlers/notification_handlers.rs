use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session::current_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::notification;

/// GET /api/notifications — the caller's latest 20, newest first, plus the
/// unread tally for the bell badge.
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    let conn = pool.get()?;
    let notifications = notification::list_for_user(&conn, user.id, 20)?;
    let unread = notification::count_unread(&conn, user.id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "notifications": notifications,
        "unread": unread,
    })))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    let conn = pool.get()?;
    let changed = notification::mark_read(&conn, path.into_inner(), user.id)?;
    if changed == 0 {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    pool: web::Data<DbPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    let conn = pool.get()?;
    notification::mark_all_read(&conn, user.id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/notifications/{id}
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    let conn = pool.get()?;
    let deleted = notification::delete(&conn, path.into_inner(), user.id)?;
    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    Ok(HttpResponse::NoContent().finish())
}
