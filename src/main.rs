use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::middleware::{Logger, from_fn};
use actix_web::{App, HttpServer, web};

use abjar::auth::middleware::require_auth;
use abjar::auth::password::hash_password;
use abjar::config::AppConfig;
use abjar::db;
use abjar::handlers::{
    attendance_handlers, auth_handlers, dashboard, notification_handlers, schedule_handlers,
    task_handlers, user_handlers, ws,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();

    if let Some(dir) = std::path::Path::new(&config.database_path).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let pool = db::init_pool(&config.database_path);
    db::run_migrations(&pool);

    let seed_student_id =
        std::env::var("SUPER_ADMIN_STUDENT_ID").unwrap_or_else(|_| "00000000".to_string());
    let seed_name =
        std::env::var("SUPER_ADMIN_NAME").unwrap_or_else(|_| "Super Admin".to_string());
    let seed_password =
        std::env::var("SUPER_ADMIN_PASSWORD").unwrap_or_else(|_| "changeme-now".to_string());
    let seed_hash = hash_password(&seed_password).expect("Failed to hash seed password");
    db::seed_super_admin(&pool, &seed_student_id, &seed_name, &seed_hash);

    let conn_map = ws::new_connection_map();
    let session_key = config.session_key.clone();
    let bind_addr = config.bind_addr.clone();

    log::info!("Starting server on {bind_addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(conn_map.clone()))
            .service(
                web::scope("/api")
                    .route("/auth/register", web::post().to(auth_handlers::register))
                    .route("/auth/login", web::post().to(auth_handlers::login))
                    .route(
                        "/auth/suggest-password",
                        web::get().to(auth_handlers::suggest_password),
                    )
                    .service(
                        web::scope("")
                            .wrap(from_fn(require_auth))
                            .route("/auth/logout", web::post().to(auth_handlers::logout))
                            .route("/auth/me", web::get().to(auth_handlers::me))
                            .route("/dashboard", web::get().to(dashboard::index))
                            .route("/schedules", web::get().to(schedule_handlers::list))
                            .route("/schedules", web::post().to(schedule_handlers::create))
                            .route("/schedules/today", web::get().to(schedule_handlers::today))
                            .route(
                                "/schedules/courses",
                                web::get().to(schedule_handlers::courses),
                            )
                            .route("/schedules/{id}", web::put().to(schedule_handlers::update))
                            .route("/schedules/{id}", web::delete().to(schedule_handlers::delete))
                            .route("/tasks", web::get().to(task_handlers::list))
                            .route("/tasks", web::post().to(task_handlers::create))
                            .route("/tasks/stats", web::get().to(task_handlers::stats))
                            .route("/tasks/{id}", web::put().to(task_handlers::update))
                            .route("/tasks/{id}", web::delete().to(task_handlers::delete))
                            .route(
                                "/tasks/{id}/completion",
                                web::post().to(task_handlers::toggle_completion),
                            )
                            .route("/attendance", web::get().to(attendance_handlers::list))
                            .route("/attendance", web::post().to(attendance_handlers::submit))
                            .route(
                                "/attendance/today",
                                web::get().to(attendance_handlers::today),
                            )
                            .route(
                                "/attendance/export",
                                web::get().to(attendance_handlers::export),
                            )
                            .route(
                                "/attendance/{id}/approve",
                                web::post().to(attendance_handlers::approve),
                            )
                            .route(
                                "/attendance/{id}/reject",
                                web::post().to(attendance_handlers::reject),
                            )
                            .route(
                                "/notifications",
                                web::get().to(notification_handlers::list),
                            )
                            .route(
                                "/notifications/read-all",
                                web::post().to(notification_handlers::mark_all_read),
                            )
                            .route(
                                "/notifications/{id}/read",
                                web::post().to(notification_handlers::mark_read),
                            )
                            .route(
                                "/notifications/{id}",
                                web::delete().to(notification_handlers::delete),
                            )
                            .route("/notifications/ws", web::get().to(ws::connect))
                            .route("/users", web::get().to(user_handlers::list))
                            .route("/users/{id}/role", web::put().to(user_handlers::change_role)),
                    ),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}
