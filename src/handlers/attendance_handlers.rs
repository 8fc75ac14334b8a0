use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Local, SecondsFormat, Utc};
use serde::Deserialize;

use crate::auth::policy;
use crate::auth::session::current_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::ws::{ConnectionMap, push_notification};
use crate::models::attendance::{self, AttendanceStatus, ListFilter};
use crate::models::user::{self, Role};
use crate::models::{notification, schedule};
use crate::reports::export;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date: Option<String>,
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub schedule_id: i64,
}

fn now_rfc3339() -> String {
    Local::now()
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// GET /api/attendance — filtered, paginated listing with status tallies.
/// Members see only their own records; admins and the super admin see all.
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;

    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(s) => Some(
            AttendanceStatus::parse(s)
                .ok_or_else(|| AppError::Validation(vec!["Unknown status filter".to_string()]))?,
        ),
    };

    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, 100);
    let filter = ListFilter {
        user_id: (user.role == Role::Member).then_some(user.id),
        date: query.date.clone().filter(|d| !d.is_empty()),
        status,
        offset: (page - 1) * per_page,
        limit: Some(per_page),
    };

    let conn = pool.get()?;
    let records = attendance::list(&conn, &filter)?;
    let counts = attendance::status_counts(&conn, &filter)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "records": records,
        "counts": counts,
        "page": page,
        "per_page": per_page,
    })))
}

/// GET /api/attendance/today — today's schedule entries annotated with
/// whether the caller already submitted and whether the class is in
/// session right now.
pub async fn today(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    if !policy::can_attend(user.role) {
        return Err(AppError::Forbidden("super admins do not attend classes".to_string()));
    }

    let conn = pool.get()?;
    let now = Local::now();
    let today = now.date_naive();
    let current_time = now.format("%H:%M").to_string();
    let date_str = today.format("%Y-%m-%d").to_string();

    let schedules = schedule::list_for_weekday(&conn, schedule::weekday_name(today.weekday()))?;
    let submitted = attendance::submitted_schedule_ids(&conn, user.id, &date_str)?;

    let entries: Vec<serde_json::Value> = schedules
        .into_iter()
        .map(|s| {
            let has_attended = submitted.contains(&s.id);
            let in_window = current_time >= s.start_time && current_time <= s.end_time;
            serde_json::json!({
                "schedule": s,
                "has_attended": has_attended,
                "can_attend": in_window && !has_attended,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(entries))
}

/// POST /api/attendance — submit attendance for one of today's classes.
/// The schedule must fall on today's weekday and the wall clock must lie
/// within its time window; the unique constraint rejects a second submit.
pub async fn submit(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<SubmitRequest>,
) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    if !policy::can_attend(user.role) {
        return Err(AppError::Forbidden("super admins do not attend classes".to_string()));
    }

    let conn = pool.get()?;
    let entry = schedule::find_by_id(&conn, body.schedule_id)?.ok_or(AppError::NotFound)?;

    let now = Local::now();
    let today = now.date_naive();
    if entry.weekday != schedule::weekday_name(today.weekday()) {
        return Err(AppError::Validation(vec!["This class does not meet today".to_string()]));
    }
    let current_time = now.format("%H:%M").to_string();
    if current_time < entry.start_time || current_time > entry.end_time {
        return Err(AppError::Validation(vec![
            "Attendance is only open during class hours".to_string(),
        ]));
    }

    let date_str = today.format("%Y-%m-%d").to_string();
    let id = attendance::submit(&conn, user.id, entry.id, &date_str)?;
    let record = attendance::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(record))
}

/// POST /api/attendance/{id}/approve
pub async fn approve(
    pool: web::Data<DbPool>,
    session: Session,
    conn_map: web::Data<ConnectionMap>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    decide(pool, session, conn_map, path.into_inner(), AttendanceStatus::Approved).await
}

/// POST /api/attendance/{id}/reject
pub async fn reject(
    pool: web::Data<DbPool>,
    session: Session,
    conn_map: web::Data<ConnectionMap>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    decide(pool, session, conn_map, path.into_inner(), AttendanceStatus::Rejected).await
}

/// Shared approve/reject path. Roles are re-read here, never taken from the
/// request: the submitter may have been promoted since the row was listed.
async fn decide(
    pool: web::Data<DbPool>,
    session: Session,
    conn_map: web::Data<ConnectionMap>,
    id: i64,
    status: AttendanceStatus,
) -> Result<HttpResponse, AppError> {
    let actor = current_user(&session, &pool)?;
    let conn = pool.get()?;
    let record = attendance::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;

    let submitter = user::find_by_id(&conn, record.user_id)?.ok_or(AppError::NotFound)?;
    if !policy::can_approve(actor.role, submitter.role, record.status) {
        if record.status != AttendanceStatus::Pending {
            return Err(AppError::Conflict("attendance record already decided".to_string()));
        }
        return Err(AppError::Forbidden("not authorized to decide this record".to_string()));
    }

    attendance::decide(&conn, id, status, actor.id, &now_rfc3339())?;

    let verb = if status == AttendanceStatus::Approved { "approved" } else { "rejected" };
    let message = format!("Your attendance for {} on {} was {verb}", record.course, record.date);
    let stored = notification::create(&conn, submitter.id, "Attendance Update", &message, "attendance")?;
    push_notification(&conn_map, &stored);

    let updated = attendance::find_by_id(&conn, id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(updated))
}

/// GET /api/attendance/export — XLSX download, one sheet per week plus a
/// summary. Members and admins export their own rows; the super admin
/// exports everything.
pub async fn export(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    let conn = pool.get()?;

    let scope = (user.role != Role::SuperAdmin).then_some(user.id);
    let records = attendance::list_for_export(&conn, scope)?;

    let bytes = export::build_workbook(&records)?;
    let filename = export::export_filename(user.role, &user.full_name, Local::now().date_naive());

    Ok(HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(bytes))
}
