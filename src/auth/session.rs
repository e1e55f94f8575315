use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::AppError;

/// Identitas aktor untuk satu request. Diisi kolaborator auth saat login;
/// core mempercayainya tanpa verifikasi ulang.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: String, // "Staff" | "Admin"
    pub login_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: HashMap<String, SessionData>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Membuat sesi baru dan mengembalikan session token (UUID v4).
    pub fn create(
        &mut self,
        user_id: i64,
        username: String,
        full_name: String,
        role: String,
    ) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        self.sessions.insert(
            token.clone(),
            SessionData {
                user_id,
                username,
                full_name,
                role,
                login_at: now,
                expires_at: now + Duration::hours(8),
            },
        );
        token
    }

    /// Validasi session token — cek ada dan belum expired.
    pub fn validate(&self, token: &str) -> Result<&SessionData, AppError> {
        match self.sessions.get(token) {
            None => Err(AppError::Auth("silakan login ulang".into())),
            Some(s) if Utc::now() > s.expires_at => {
                Err(AppError::Auth("sesi expired, silakan login ulang".into()))
            }
            Some(s) => Ok(s),
        }
    }

    /// Hapus sesi (logout).
    pub fn destroy(&mut self, token: &str) {
        self.sessions.remove(token);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
