use actix_web::cookie::Key;

/// Runtime configuration, read once at startup from the environment
/// (a `.env` file is honored via dotenvy).
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_path: String,
    /// Shared code that gates self-registration. Handed out by admins.
    pub registration_code: String,
    pub session_key: Key,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/abjar.db".to_string());

        let registration_code = match std::env::var("REGISTRATION_CODE") {
            Ok(code) if !code.trim().is_empty() => code,
            _ => {
                log::warn!("No REGISTRATION_CODE set — registration is disabled until one is configured");
                String::new()
            }
        };

        // Session encryption key — load from SESSION_KEY for persistent
        // sessions across restarts.
        let session_key = match std::env::var("SESSION_KEY") {
            Ok(val) if val.len() >= 64 => {
                log::info!("Using SESSION_KEY from environment");
                Key::from(val.as_bytes())
            }
            Ok(val) => {
                log::warn!(
                    "SESSION_KEY too short ({} bytes, need 64+) — generating random key",
                    val.len()
                );
                Key::generate()
            }
            Err(_) => {
                log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
                Key::generate()
            }
        };

        AppConfig {
            bind_addr,
            database_path,
            registration_code,
            session_key,
        }
    }
}
