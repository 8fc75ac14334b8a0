use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = SqliteConnectionManager::file(database_url).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    });
    Pool::builder()
        .max_size(8)
        .build(manager)
        .expect("Failed to create DB pool")
}

pub fn run_migrations(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Seed the singular super admin account if no user holds that role yet.
/// The super admin role is never assignable through the API, so a fresh
/// database must start with one.
pub fn seed_super_admin(pool: &DbPool, student_id: &str, full_name: &str, password_hash: &str) {
    let conn = pool.get().expect("Failed to get DB connection for seeding");

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'super_admin'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    if count > 0 {
        log::info!("Super admin already present, skipping seed");
        return;
    }

    conn.execute(
        "INSERT INTO users (full_name, student_id, password, role)
         VALUES (?1, ?2, ?3, 'super_admin')",
        params![full_name, student_id, password_hash],
    )
    .expect("Failed to seed super admin");
    log::info!("Seeded super admin account ({student_id})");
}
