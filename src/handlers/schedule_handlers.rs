use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Local};

use crate::auth::policy;
use crate::auth::session::current_user;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::schedule::{self, ScheduleInput, WEEKDAYS, weekday_name};

fn validate_input(input: &ScheduleInput) -> Result<(), AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_required(&input.course, "Course", 100));
    errors.extend(validate::validate_optional(&input.description, "Description", 500));
    if !WEEKDAYS.contains(&input.weekday.as_str()) {
        errors.push("Weekday must be monday through sunday".to_string());
    }
    errors.extend(validate::validate_time(&input.start_time, "Start time"));
    errors.extend(validate::validate_time(&input.end_time, "End time"));
    if errors.is_empty() && input.start_time >= input.end_time {
        errors.push("Start time must be before end time".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// GET /api/schedules — the full timetable, Monday first.
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    current_user(&session, &pool)?;
    let conn = pool.get()?;
    let schedules = schedule::list(&conn)?;
    Ok(HttpResponse::Ok().json(schedules))
}

/// GET /api/schedules/today — entries matching today's weekday.
pub async fn today(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    current_user(&session, &pool)?;
    let conn = pool.get()?;
    let day = weekday_name(Local::now().date_naive().weekday());
    let schedules = schedule::list_for_weekday(&conn, day)?;
    Ok(HttpResponse::Ok().json(schedules))
}

/// GET /api/schedules/courses — distinct course names, for the task form.
pub async fn courses(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    current_user(&session, &pool)?;
    let conn = pool.get()?;
    let names = schedule::course_names(&conn)?;
    Ok(HttpResponse::Ok().json(names))
}

/// POST /api/schedules
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<ScheduleInput>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    if !policy::can_manage_catalog(user.role) {
        return Err(AppError::Forbidden("only admins manage schedules".to_string()));
    }
    validate_input(&body)?;

    let conn = pool.get()?;
    let id = schedule::create(&conn, &body, user.id)?;
    let created = schedule::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(created))
}

/// PUT /api/schedules/{id}
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<ScheduleInput>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    if !policy::can_manage_catalog(user.role) {
        return Err(AppError::Forbidden("only admins manage schedules".to_string()));
    }
    validate_input(&body)?;

    let id = path.into_inner();
    let conn = pool.get()?;
    schedule::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    schedule::update(&conn, id, &body)?;
    let updated = schedule::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/schedules/{id} — attendance rows cascade with the entry.
pub async fn delete(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    if !policy::can_manage_catalog(user.role) {
        return Err(AppError::Forbidden("only admins manage schedules".to_string()));
    }

    let id = path.into_inner();
    let conn = pool.get()?;
    schedule::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    schedule::delete(&conn, id)?;
    Ok(HttpResponse::NoContent().finish())
}
