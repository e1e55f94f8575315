use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_STAFF: &str = "Staff";

/// Aktor yang melakukan aksi. Manajemen akun (password, login) ditangani
/// kolaborator auth di luar core ini; tabel users ada untuk integritas FK
/// dan join saat query log.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub role: String, // "Staff" | "Admin"
    pub created_at: Option<String>,
}
