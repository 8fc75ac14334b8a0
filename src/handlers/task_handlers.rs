use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Local, SecondsFormat, Utc};

use crate::auth::policy;
use crate::auth::session::current_user;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::ws::{ConnectionMap, push_notification};
use crate::models::{notification, task, user};
use crate::models::task::TaskInput;

fn now_rfc3339() -> String {
    Local::now()
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn validate_input(input: &TaskInput) -> Result<(), AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_required(&input.course, "Course", 100));
    errors.extend(validate::validate_optional(&input.description, "Description", 500));
    if DateTime::parse_from_rfc3339(&input.deadline).is_err() {
        errors.push("Deadline must be an RFC 3339 timestamp".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// GET /api/tasks — every task, earliest deadline first. Members and admins
/// also get their own completion rows so the client can mark state.
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    let conn = pool.get()?;
    let tasks = task::list(&conn)?;

    let completions = if policy::can_mark_complete(user.role) {
        task::completions_for_user(&conn, user.id)?
    } else {
        Vec::new()
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "tasks": tasks,
        "completions": completions,
    })))
}

/// GET /api/tasks/stats — per-task completion tallies (admin oversight).
pub async fn stats(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    if !policy::can_view_stats(user.role) {
        return Err(AppError::Forbidden("completion stats are admin-only".to_string()));
    }
    let conn = pool.get()?;
    let stats = task::completion_stats(&conn)?;
    Ok(HttpResponse::Ok().json(stats))
}

/// POST /api/tasks — create a task and notify every account about it.
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    conn_map: web::Data<ConnectionMap>,
    body: web::Json<TaskInput>,
) -> Result<HttpResponse, AppError> {
    let actor = current_user(&session, &pool)?;
    if !policy::can_manage_catalog(actor.role) {
        return Err(AppError::Forbidden("only admins manage tasks".to_string()));
    }
    validate_input(&body)?;

    let conn = pool.get()?;
    let id = task::create(&conn, &body, actor.id)?;
    let created = task::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;

    // Fan a "new task" notification out to all users
    let recipients: Vec<i64> = user::list(&conn, None)?.into_iter().map(|u| u.id).collect();
    let message = format!("New task for {}: {}", created.course, created.description);
    let stored = notification::create_for_users(&conn, &recipients, "New Task", &message, "task")?;
    for n in &stored {
        push_notification(&conn_map, n);
    }

    Ok(HttpResponse::Created().json(created))
}

/// PUT /api/tasks/{id}
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<TaskInput>,
) -> Result<HttpResponse, AppError> {
    let actor = current_user(&session, &pool)?;
    if !policy::can_manage_catalog(actor.role) {
        return Err(AppError::Forbidden("only admins manage tasks".to_string()));
    }
    validate_input(&body)?;

    let id = path.into_inner();
    let conn = pool.get()?;
    task::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    task::update(&conn, id, &body)?;
    let updated = task::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/tasks/{id} — completion rows cascade.
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let actor = current_user(&session, &pool)?;
    if !policy::can_manage_catalog(actor.role) {
        return Err(AppError::Forbidden("only admins manage tasks".to_string()));
    }

    let id = path.into_inner();
    let conn = pool.get()?;
    task::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    task::delete(&conn, id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/tasks/{id}/completion — toggle the caller's completion state
/// for this task. Completing stamps the timestamp; un-completing clears it.
pub async fn toggle_completion(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let actor = current_user(&session, &pool)?;
    if !policy::can_mark_complete(actor.role) {
        return Err(AppError::Forbidden("super admins do not complete tasks".to_string()));
    }

    let id = path.into_inner();
    let conn = pool.get()?;
    task::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    let completion = task::toggle_completion(&conn, id, actor.id, &now_rfc3339())?;
    Ok(HttpResponse::Ok().json(completion))
}
