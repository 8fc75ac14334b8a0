use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::{password, validate};
use crate::auth::session::{clear, current_user, set_user_id};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::user::{self, NewUser, UserDisplay};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub student_id: String,
    pub password: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub student_id: String,
    pub password: String,
}

/// POST /api/auth/register — create a member account. Gated by the shared
/// registration code; the code is checked before anything touches the
/// database, and a wrong code rejects even an otherwise valid form.
pub async fn register(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_full_name(&body.full_name));
    errors.extend(validate::validate_student_id(&body.student_id));
    errors.extend(validate::validate_password(&body.password));
    if body.code.trim().is_empty() {
        errors.push("Registration code is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if config.registration_code.is_empty() || body.code != config.registration_code {
        return Err(AppError::Forbidden("invalid registration code".to_string()));
    }

    let hashed = password::hash_password(&body.password).map_err(AppError::Hash)?;

    let conn = pool.get()?;
    let new_user = NewUser {
        full_name: body.full_name.trim().to_string(),
        student_id: body.student_id.trim().to_string(),
        password: hashed,
    };
    let user_id = user::create(&conn, &new_user)?;
    log::info!("Registered new member account {user_id}");

    let created = user::find_by_id(&conn, user_id)?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(UserDisplay::from(created)))
}

/// POST /api/auth/login — verify credentials and open a session. The
/// response never distinguishes an unknown student id from a bad password.
pub async fn login(
    pool: web::Data<DbPool>,
    session: Session,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let found = user::find_by_student_id(&conn, body.student_id.trim())?;

    let user = match found {
        Some(u) if password::verify_password(&body.password, &u.password).unwrap_or(false) => u,
        _ => return Err(AppError::Unauthorized),
    };

    set_user_id(&session, user.id)?;
    log::info!("User {} logged in", user.id);
    Ok(HttpResponse::Ok().json(UserDisplay::from(user)))
}

/// POST /api/auth/logout
pub async fn logout(session: Session) -> HttpResponse {
    clear(&session);
    HttpResponse::NoContent().finish()
}

/// GET /api/auth/me — the session user, re-read from the database so the
/// client always sees its current role.
pub async fn me(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let user = current_user(&session, &pool)?;
    Ok(HttpResponse::Ok().json(UserDisplay::from(user)))
}

/// GET /api/auth/suggest-password — a generated strong password for the
/// registration form.
pub async fn suggest_password() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "password": password::generate_password(),
    }))
}
