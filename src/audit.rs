//! Audit trail: append entri staff_logs dan resolver aksi dari log
//!
//! Setiap mutasi katalog mencatat tepat satu entri. Entri bersifat
//! append-only; timestamp diisi oleh store saat insert, bukan pemanggil.

use regex::Regex;
use sqlx::SqlitePool;
use std::sync::OnceLock;

use crate::errors::AppError;
use crate::models::book::STATUS_INACTIVE;
use crate::models::user::ROLE_ADMIN;

/// Audit log actions untuk katalog buku
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookAuditAction {
    AddBook,
    UpdateBook,
    DeleteBook,
    RestoreBook,
    PermanentDeleteBook,
    ViewBook,
}

impl BookAuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookAuditAction::AddBook => "ADD_BOOK",
            BookAuditAction::UpdateBook => "UPDATE_BOOK",
            BookAuditAction::DeleteBook => "DELETE_BOOK",
            BookAuditAction::RestoreBook => "RESTORE_BOOK",
            BookAuditAction::PermanentDeleteBook => "PERMANENT_DELETE_BOOK",
            BookAuditAction::ViewBook => "VIEW_BOOK",
        }
    }
}

/// Append satu entri audit. Gagal bila staff_id tidak dikenal (FK);
/// kegagalan ini menghentikan aksi pemanggil walau mutasi utamanya
/// sudah commit. Mengembalikan id entri baru.
pub async fn log_staff_action(
    db: &SqlitePool,
    staff_id: i64,
    action: BookAuditAction,
    details: &str,
    related_book_id: Option<i64>,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO staff_logs (staff_id, action_type, details, related_book_id)
         VALUES (?, ?, ?, ?)",
    )
    .bind(staff_id)
    .bind(action.as_str())
    .bind(details)
    .bind(related_book_id)
    .execute(db)
    .await;

    match result {
        Ok(res) => Ok(res.last_insert_rowid()),
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            crate::log_error!(
                "AUDIT",
                "Append log gagal: staff tidak dikenal",
                format!("staff_id={}", staff_id)
            );
            Err(AppError::Internal(
                "Gagal mencatat aktivitas: aktor tidak dikenal".into(),
            ))
        }
        Err(e) => Err(AppError::internal("log_staff_action", e)),
    }
}

static BOOK_ID_RE: OnceLock<Regex> = OnceLock::new();

fn book_id_re() -> &'static Regex {
    // Pola seperti "(ID: 8)", "ID 8", "id:12" — match pertama yang dipakai.
    BOOK_ID_RE.get_or_init(|| Regex::new(r"(?i)ID\s*[:(]?\s*(\d+)").expect("pola regex valid"))
}

/// Ekstrak id buku dari teks details. None bila polanya tidak ada —
/// entri seperti itu tidak menawarkan aksi apa pun.
pub fn extract_book_id(details: &str) -> Option<i64> {
    book_id_re()
        .captures(details)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Referensi buku dari satu entri: kolom terstruktur lebih dipercaya,
/// entri lama tanpa kolom itu jatuh ke parsing teks.
pub fn referenced_book_id(related_book_id: Option<i64>, details: &str) -> Option<i64> {
    related_book_id.or_else(|| extract_book_id(details))
}

/// Aksi reversal yang bisa ditawarkan UI log untuk satu entri.
/// `executable` hanya true untuk Admin; role lain tetap melihat aksinya
/// ada, tapi command mutasinya akan menolak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LogActions {
    pub book_id: i64,
    pub can_restore: bool,
    pub can_purge: bool,
    pub executable: bool,
}

/// Resolve aksi dari satu entri log:
/// - tidak ada referensi buku, atau bukunya sudah tidak ada → None
/// - buku inactive → restore tersedia
/// - status apa pun → permanent delete tersedia
pub async fn resolve_log_actions(
    db: &SqlitePool,
    related_book_id: Option<i64>,
    details: &str,
    role: &str,
) -> Result<Option<LogActions>, AppError> {
    let Some(book_id) = referenced_book_id(related_book_id, details) else {
        return Ok(None);
    };

    let status: Option<(String,)> = sqlx::query_as("SELECT status FROM books WHERE id = ?")
        .bind(book_id)
        .fetch_optional(db)
        .await
        .map_err(|e| AppError::internal("resolve_log_actions", e))?;

    let Some((status,)) = status else {
        return Ok(None);
    };

    Ok(Some(LogActions {
        book_id,
        can_restore: status == STATUS_INACTIVE,
        can_purge: true,
        executable: role == ROLE_ADMIN,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::init_memory_db;
    use crate::models::user::{ROLE_ADMIN, ROLE_STAFF};

    #[test]
    fn extracts_id_from_common_patterns() {
        assert_eq!(extract_book_id("Deactivated book: 'Dune' (ID: 42)"), Some(42));
        assert_eq!(extract_book_id("Memperbarui buku ID 7: Judul"), Some(7));
        assert_eq!(extract_book_id("id:12 diubah"), Some(12));
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(extract_book_id("buku (ID: 3) menggantikan (ID: 9)"), Some(3));
    }

    #[test]
    fn no_pattern_means_no_reference() {
        assert_eq!(extract_book_id("Login berhasil"), None);
        assert_eq!(extract_book_id(""), None);
    }

    #[test]
    fn structured_column_takes_precedence() {
        assert_eq!(referenced_book_id(Some(5), "teks lain (ID: 9)"), Some(5));
        assert_eq!(referenced_book_id(None, "teks lain (ID: 9)"), Some(9));
        assert_eq!(referenced_book_id(None, "tanpa pola"), None);
    }

    async fn seed_staff(db: &sqlx::SqlitePool) -> i64 {
        sqlx::query("INSERT INTO users (full_name, username, role) VALUES ('Nam', 'nam', 'Staff')")
            .execute(db)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    #[tokio::test]
    async fn append_assigns_id_and_timestamp() {
        let pool = init_memory_db().await.unwrap();
        let staff = seed_staff(&pool).await;

        let id = log_staff_action(&pool, staff, BookAuditAction::AddBook, "Tes (ID: 1)", Some(1))
            .await
            .unwrap();
        assert!(id > 0);

        let (ts,): (Option<String>,) =
            sqlx::query_as("SELECT timestamp FROM staff_logs WHERE id = ?")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(ts.is_some());
    }

    #[tokio::test]
    async fn append_rejects_unknown_staff() {
        let pool = init_memory_db().await.unwrap();

        let result =
            log_staff_action(&pool, 999, BookAuditAction::AddBook, "tes", None).await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM staff_logs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn resolver_offers_restore_only_when_inactive() {
        let pool = init_memory_db().await.unwrap();

        sqlx::query(
            "INSERT INTO books (title, author, category, isbn, price, stock_quantity, status)
             VALUES ('Dune', 'Herbert', 'Fiksi', '9780441013593', 120000.0, 5, 'inactive')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let actions = resolve_log_actions(&pool, None, "Deactivated book (ID: 1)", ROLE_ADMIN)
            .await
            .unwrap()
            .unwrap();
        assert!(actions.can_restore);
        assert!(actions.can_purge);
        assert!(actions.executable);

        sqlx::query("UPDATE books SET status = 'active' WHERE id = 1")
            .execute(&pool)
            .await
            .unwrap();

        let actions = resolve_log_actions(&pool, Some(1), "apapun", ROLE_STAFF)
            .await
            .unwrap()
            .unwrap();
        assert!(!actions.can_restore);
        assert!(actions.can_purge);
        assert!(!actions.executable);
    }

    #[tokio::test]
    async fn resolver_returns_none_for_missing_book() {
        let pool = init_memory_db().await.unwrap();

        let actions = resolve_log_actions(&pool, Some(404), "buku (ID: 404)", ROLE_ADMIN)
            .await
            .unwrap();
        assert!(actions.is_none());

        let actions = resolve_log_actions(&pool, None, "tanpa referensi", ROLE_ADMIN)
            .await
            .unwrap();
        assert!(actions.is_none());
    }
}
