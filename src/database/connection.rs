use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

use super::migrations::run_migrations;
use crate::config::get_config;
use crate::errors::AppError;

/// Inisialisasi database SQLite dengan connection pooling.
/// File database disimpan di direktori data aplikasi.
///
/// - WAL mode untuk concurrent reads/writes
/// - Foreign keys enforcement (staff_logs.staff_id, books.created_by)
/// - Busy timeout untuk akses bersamaan
pub async fn init_db(app_data_dir: &Path) -> Result<SqlitePool, AppError> {
    std::fs::create_dir_all(app_data_dir)
        .map_err(|e| AppError::Internal(format!("Gagal membuat direktori data: {}", e)))?;

    let config = get_config();
    let db_path = config.get_database_path(app_data_dir);
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool_options = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.connect_timeout_secs,
        ))
        .idle_timeout(std::time::Duration::from_secs(
            config.database.idle_timeout_secs,
        ));

    let pool = pool_options.connect_with(options).await?;

    run_migrations(&pool).await?;

    crate::log_info!("DATABASE", "Connection pool siap", serde_json::json!({
        "db": db_path.display().to_string(),
        "max_connections": config.database.max_connections
    }));

    Ok(pool)
}

/// Pool in-memory untuk test dan tooling. Satu koneksi saja supaya
/// database in-memory tidak hilang antar acquire.
pub async fn init_memory_db() -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Health check: Ok(()) jika database terjangkau.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
