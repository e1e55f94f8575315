//! Core panel admin inventaris buku: katalog dengan soft-delete dan
//! restore, audit trail per aksi staf, plus resolver aksi dari halaman
//! log. Autentikasi, HTTP, dan upload file adalah kolaborator eksternal;
//! crate ini menerima session token dan hasil upload yang sudah jadi.

pub mod audit;
pub mod auth;
pub mod commands;
pub mod config;
pub mod database;
pub mod errors;
pub mod logger;
pub mod models;
pub mod validation;

use std::path::Path;
use std::sync::Mutex;

use sqlx::SqlitePool;

use auth::session::SessionStore;
use errors::AppError;

/// Shared state untuk semua command: pool database dan session store.
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: Mutex<SessionStore>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            sessions: Mutex::new(SessionStore::new()),
        }
    }
}

/// Inisialisasi aplikasi: konfigurasi, logger, lalu database dengan
/// migrasi. Kegagalan logger tidak fatal, aplikasi tetap jalan.
pub async fn init(app_data_dir: &Path) -> Result<AppState, AppError> {
    config::init_config();

    if let Err(e) = logger::init_global_logger(app_data_dir) {
        eprintln!("Logger gagal diinisialisasi: {}", e);
    }

    let db = database::connection::init_db(app_data_dir).await?;
    Ok(AppState::new(db))
}
