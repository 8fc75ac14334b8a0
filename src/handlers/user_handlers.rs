use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::policy;
use crate::auth::session::current_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::ws::{ConnectionMap, push_notification};
use crate::models::notification;
use crate::models::user::{self, Role, UserDisplay};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleChangeRequest {
    pub role: String,
}

/// GET /api/users — all accounts with optional name/student-id search,
/// plus role tallies for the management view. Super admin only.
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let actor = current_user(&session, &pool)?;
    if actor.role != Role::SuperAdmin {
        return Err(AppError::Forbidden("user management is super admin only".to_string()));
    }

    let conn = pool.get()?;
    let users = user::list(&conn, query.search.as_deref())?;
    let counts = user::role_counts(&conn)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "users": users,
        "counts": counts,
    })))
}

/// PUT /api/users/{id}/role — promote a member to admin or demote an admin
/// back to member. Both the target's role and the admin count are re-read
/// inside this request, so a stale management page cannot push the admin
/// count past the cap or change a user twice.
pub async fn change_role(
    pool: web::Data<DbPool>,
    session: Session,
    conn_map: web::Data<ConnectionMap>,
    path: web::Path<i64>,
    body: web::Json<RoleChangeRequest>,
) -> Result<HttpResponse, AppError> {
    let actor = current_user(&session, &pool)?;
    let target_id = path.into_inner();

    let new_role = Role::parse(&body.role)
        .ok_or_else(|| AppError::Validation(vec!["Unknown role".to_string()]))?;
    if new_role == Role::SuperAdmin {
        return Err(AppError::Validation(vec![
            "The super admin role cannot be assigned".to_string(),
        ]));
    }

    let conn = pool.get()?;
    let target = user::find_by_id(&conn, target_id)?.ok_or(AppError::NotFound)?;
    if target.role == new_role {
        return Err(AppError::Conflict(format!(
            "user already has the {} role",
            new_role.as_str()
        )));
    }

    let allowed = match new_role {
        Role::Admin => {
            let admin_count = user::count_by_role(&conn, Role::Admin)?;
            policy::can_promote(actor.role, actor.id, target.role, target.id, admin_count)
        }
        Role::Member => policy::can_demote(actor.role, actor.id, target.role, target.id),
        Role::SuperAdmin => unreachable!("rejected above"),
    };
    if !allowed {
        return Err(AppError::Forbidden("role change not permitted".to_string()));
    }

    user::update_role(&conn, target.id, new_role)?;
    log::info!(
        "User {} role changed {} -> {} by {}",
        target.id,
        target.role.as_str(),
        new_role.as_str(),
        actor.id
    );

    let message = match new_role {
        Role::Admin => "You have been promoted to admin".to_string(),
        _ => "Your admin role has been removed".to_string(),
    };
    let stored = notification::create(&conn, target.id, "Role Update", &message, "role_change")?;
    push_notification(&conn_map, &stored);

    let updated = user::find_by_id(&conn, target.id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Ok().json(UserDisplay::from(updated)))
}
