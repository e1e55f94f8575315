use serde::{Deserialize, Serialize};

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";

/// Satu record katalog. Status "inactive" mencakup soft-delete manual
/// maupun nonaktif otomatis karena stok habis; record hanya hilang dari
/// persistence lewat permanent delete.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub isbn: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: i64,
    pub image_path: Option<String>,
    pub status: String, // "active" | "inactive"
    pub created_by: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Hasil dari kolaborator upload gambar eksternal. Core hanya menyimpan
/// path yang dikembalikan, tidak pernah membaca isi file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploadResult {
    pub success: bool,
    pub path: Option<String>,
    pub error: Option<String>,
}

/// Input form tambah/edit buku. `image` diisi dari hasil kolaborator
/// upload; None berarti tidak ada file baru.
#[derive(Debug, Clone, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub category: String,
    pub isbn: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock_quantity: i64,
    pub image: Option<ImageUploadResult>,
}

/// Filter listing buku. Status default "active"; nilai selain
/// "inactive" diperlakukan sebagai "active".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookListFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Satu halaman hasil listing, dengan total untuk pagination.
#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub items: Vec<Book>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl BookPage {
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }
}

/// Hasil restore: sudah aktif adalah sukses tersendiri, tanpa update
/// dan tanpa entri log baru.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreOutcome {
    Restored,
    AlreadyActive,
}
