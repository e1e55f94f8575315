use serde::{Deserialize, Serialize};

/// Entri audit log. Append-only: tidak pernah diubah atau dihapus.
/// `related_book_id` adalah referensi terstruktur ke buku; entri lama
/// tanpa kolom ini di-resolve dari teks `details` (lihat `audit`).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StaffLog {
    pub id: i64,
    pub staff_id: i64,
    pub action_type: String,
    pub details: String,
    pub related_book_id: Option<i64>,
    pub timestamp: Option<String>,
}

/// Entri log + identitas aktor (JOIN users).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StaffLogWithUser {
    pub id: i64,
    pub staff_id: i64,
    pub full_name: String,
    pub username: String,
    pub action_type: String,
    pub details: String,
    pub related_book_id: Option<i64>,
    pub timestamp: Option<String>,
}

/// Filter query log; semua opsional dan independen.
/// Tanggal dalam format "YYYY-MM-DD", inklusif berdasarkan tanggal
/// kalender dari timestamp.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilter {
    pub staff_id: Option<i64>,
    pub action_type: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogPage {
    pub items: Vec<StaffLogWithUser>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Opsi dropdown filter nama staf.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StaffOption {
    pub id: i64,
    pub full_name: String,
    pub username: String,
}

/// Ringkasan aktivitas untuk panel statistik log.
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub today_count: i64,
    pub week_count: i64,
    pub most_active_staff_today: Option<String>,
    pub most_common_action_today: Option<String>,
}
