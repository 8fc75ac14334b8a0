//! Registration endpoint tests — the shared-code gate, field validation,
//! and the duplicate student id conflict, exercised over HTTP.

use actix_web::cookie::Key;
use actix_web::{App, test, web};
use tempfile::TempDir;

use abjar::config::AppConfig;
use abjar::db::{self, DbPool};
use abjar::handlers::auth_handlers;

const CODE: &str = "RH25TEST";

fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        database_path: String::new(),
        registration_code: CODE.to_string(),
        session_key: Key::generate(),
    }
}

fn setup_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let pool = db::init_pool(dir.path().join("test.db").to_str().expect("utf8 path"));
    db::run_migrations(&pool);
    (dir, pool)
}

fn valid_body(code: &str) -> serde_json::Value {
    serde_json::json!({
        "full_name": "Andi Pratama",
        "student_id": "12345678",
        "password": "Str0ng!pass",
        "code": code,
    })
}

macro_rules! register_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(test_config()))
                .route("/api/auth/register", web::post().to(auth_handlers::register)),
        )
        .await
    };
}

#[actix_web::test]
async fn test_register_with_valid_code_creates_member() {
    let (_dir, pool) = setup_pool();
    let app = register_app!(pool);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(valid_body(CODE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["role"], "member");
    assert_eq!(body["student_id"], "12345678");
    assert!(body.get("password").is_none());
}

#[actix_web::test]
async fn test_register_rejects_wrong_code_despite_valid_fields() {
    let (_dir, pool) = setup_pool();
    let app = register_app!(pool);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(valid_body("WRONG"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // Nothing was written.
    let conn = pool.get().expect("conn");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .expect("count");
    assert_eq!(count, 0);
}

#[actix_web::test]
async fn test_register_validates_fields_before_code() {
    let (_dir, pool) = setup_pool();
    let app = register_app!(pool);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "full_name": "Al",
            "student_id": "12ab",
            "password": "weak",
            "code": "",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_failed");
    // One message per failing field plus the missing code.
    assert_eq!(body["details"].as_array().expect("details").len(), 4);
}

#[actix_web::test]
async fn test_register_duplicate_student_id_is_conflict() {
    let (_dir, pool) = setup_pool();
    let app = register_app!(pool);

    let first = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(valid_body(CODE))
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), 201);

    let second = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(serde_json::json!({
            "full_name": "Someone Else",
            "student_id": "12345678",
            "password": "Str0ng!pass",
            "code": CODE,
        }))
        .to_request();
    let resp = test::call_service(&app, second).await;
    assert_eq!(resp.status(), 409);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "conflict");
}
