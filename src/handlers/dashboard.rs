use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Days, Local, SecondsFormat, Utc};

use crate::auth::session::current_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::attendance;
use crate::models::user::{self, Role};
use crate::models::{schedule, task};
use crate::reports::weekly;

/// GET /api/dashboard — one role-shaped aggregate: today's classes, the
/// next tasks, and counts from the caller's perspective. Non-super-admins
/// additionally get their weekly attendance rate and 7-day series.
pub async fn index(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    let conn = pool.get()?;

    let now = Local::now();
    let today = now.date_naive();
    let now_str = now
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true);

    let today_schedule = schedule::list_for_weekday(&conn, schedule::weekday_name(today.weekday()))?;
    let upcoming_tasks = task::list_upcoming(&conn, &now_str, 5)?;
    let total_schedules = schedule::count(&conn)?;
    let active_tasks = task::count_active(&conn, &now_str)?;

    // Pending count from the caller's approval perspective: the rows they
    // are expected to act on, or their own submissions for members.
    let pending_attendance = match user.role {
        Role::SuperAdmin => attendance::count_pending_by_submitter_role(&conn, Role::Admin)?,
        Role::Admin => attendance::count_pending_by_submitter_role(&conn, Role::Member)?,
        Role::Member => attendance::count_pending_for_user(&conn, user.id)?,
    };

    let stats = serde_json::json!({
        "total_schedules": total_schedules,
        "active_tasks": active_tasks,
        "pending_attendance": pending_attendance,
    });

    if user.role == Role::SuperAdmin {
        let counts = user::role_counts(&conn)?;
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "user": user::UserDisplay::from(user),
            "today_schedule": today_schedule,
            "upcoming_tasks": upcoming_tasks,
            "stats": stats,
            "user_counts": counts,
        })));
    }

    let since = (today - Days::new(6)).format("%Y-%m-%d").to_string();
    let records = attendance::dated_statuses_since(&conn, user.id, &since)?;
    let report = weekly::weekly_report(today, &records);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user": user::UserDisplay::from(user),
        "today_schedule": today_schedule,
        "upcoming_tasks": upcoming_tasks,
        "stats": stats,
        "weekly_attendance": report,
    })))
}
