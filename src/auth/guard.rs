//! Capability check terpusat: satu fungsi (aktor, aksi) menggantikan
//! cek role yang tersebar di tiap call site.

use super::session::SessionData;
use crate::errors::AppError;
use crate::models::user::{ROLE_ADMIN, ROLE_STAFF};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Tambah/edit/soft-delete buku dan melihat listing/detail.
    ManageCatalog,
    /// Melihat audit log dan filternya.
    ViewLogs,
    /// Memulihkan buku inactive (Admin only).
    RestoreBook,
    /// Hapus permanen buku beserta asetnya (Admin only).
    PurgeBook,
}

impl Capability {
    fn allowed_for(&self, role: &str) -> bool {
        match self {
            Capability::ManageCatalog | Capability::ViewLogs => {
                role == ROLE_ADMIN || role == ROLE_STAFF
            }
            Capability::RestoreBook | Capability::PurgeBook => role == ROLE_ADMIN,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Capability::ManageCatalog => "mengelola katalog",
            Capability::ViewLogs => "melihat log aktivitas",
            Capability::RestoreBook => "memulihkan buku",
            Capability::PurgeBook => "menghapus buku secara permanen",
        }
    }
}

/// Validasi session dan pastikan aktor memegang capability yang diminta.
/// Mengembalikan clone SessionData untuk dipakai operasi selanjutnya.
pub fn require(state: &AppState, token: &str, cap: Capability) -> Result<SessionData, AppError> {
    let store = state
        .sessions
        .lock()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let session = store.validate(token)?.clone();

    if !cap.allowed_for(&session.role) {
        return Err(AppError::Forbidden(format!(
            "hanya Admin yang dapat {}",
            cap.label()
        )));
    }

    Ok(session)
}
