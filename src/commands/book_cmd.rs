//! Lifecycle katalog buku: create/edit/soft-delete/restore/permanent-delete
//! plus sweep stok-nol dan listing.
//!
//! Setiap mutasi yang berhasil mencatat tepat satu entri audit; sweep
//! otomatis tidak dicatat. Validasi mengumpulkan semua pesan sebelum
//! persistence dicoba.

use crate::audit::{self, BookAuditAction};
use crate::auth::guard::{self, Capability};
use crate::config::get_config;
use crate::errors::AppError;
use crate::models::book::{
    Book, BookListFilter, BookPage, BookPayload, RestoreOutcome, STATUS_ACTIVE, STATUS_INACTIVE,
};
use crate::validation;
use crate::AppState;
use sqlx::SqlitePool;

/// Cek apakah ISBN sudah dipakai record lain. Berlaku untuk SEMUA baris
/// tanpa memandang status; `exclude_id` dipakai Edit agar record sendiri
/// tidak terhitung.
pub async fn duplicate_isbn(
    db: &SqlitePool,
    isbn: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    let existing: Option<(i64,)> = match exclude_id {
        Some(id) => {
            sqlx::query_as("SELECT id FROM books WHERE isbn = ? AND id != ?")
                .bind(isbn)
                .bind(id)
                .fetch_optional(db)
                .await
        }
        None => {
            sqlx::query_as("SELECT id FROM books WHERE isbn = ?")
                .bind(isbn)
                .fetch_optional(db)
                .await
        }
    }
    .map_err(|e| AppError::internal("duplicate_isbn", e))?;

    Ok(existing.is_some())
}

/// Cek duplikat judul, aturan sama dengan [`duplicate_isbn`].
pub async fn duplicate_title(
    db: &SqlitePool,
    title: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    let existing: Option<(i64,)> = match exclude_id {
        Some(id) => {
            sqlx::query_as("SELECT id FROM books WHERE title = ? AND id != ?")
                .bind(title)
                .bind(id)
                .fetch_optional(db)
                .await
        }
        None => {
            sqlx::query_as("SELECT id FROM books WHERE title = ?")
                .bind(title)
                .fetch_optional(db)
                .await
        }
    }
    .map_err(|e| AppError::internal("duplicate_title", e))?;

    Ok(existing.is_some())
}

async fn fetch_book(db: &SqlitePool, id: i64) -> Result<Option<Book>, AppError> {
    sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
        .map_err(|e| AppError::internal("fetch_book", e))
}

/// Hapus file aset gambar, best-effort: kegagalan tidak menggagalkan
/// operasi pemanggil, hanya dicatat.
fn remove_image_asset(path: &str) {
    if path.is_empty() {
        return;
    }
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            crate::log_warn!(
                "UPLOAD",
                &format!("Gagal menghapus aset gambar {}: {}", path, e)
            );
        }
    }
}

fn empty_to_none(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Buat buku baru (status awal: active). Duplikat ISBN/judul dicek
/// terhadap semua record tanpa pengecualian; unique index di storage
/// layer menutup race check-then-write.
pub async fn create_book(
    state: &AppState,
    session_token: &str,
    payload: BookPayload,
) -> Result<Book, AppError> {
    let session = guard::require(state, session_token, Capability::ManageCatalog)?;

    let mut errors = validation::collect_book_errors(&payload);

    let title = payload.title.trim().to_string();
    let isbn = validation::normalize_isbn(&payload.isbn);

    if !isbn.is_empty() && duplicate_isbn(&state.db, &isbn, None).await? {
        errors.push("ISBN ini sudah terdaftar di sistem".into());
    }
    if !title.is_empty() && duplicate_title(&state.db, &title, None).await? {
        errors.push("Judul ini sudah terdaftar di sistem".into());
    }

    let mut image_path: Option<String> = None;
    if let Some(image) = &payload.image {
        if image.success {
            image_path = image.path.clone();
        } else {
            errors.push(
                image
                    .error
                    .clone()
                    .unwrap_or_else(|| "Upload gambar gagal".into()),
            );
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let result = sqlx::query(
        "INSERT INTO books (title, author, category, isbn, description, price,
                            stock_quantity, image_path, status, created_by)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active', ?)",
    )
    .bind(&title)
    .bind(payload.author.trim())
    .bind(payload.category.trim())
    .bind(&isbn)
    .bind(empty_to_none(payload.description.clone()))
    .bind(payload.price)
    .bind(payload.stock_quantity)
    .bind(&image_path)
    .bind(session.user_id)
    .execute(&state.db)
    .await;

    match result {
        Ok(res) => {
            let id = res.last_insert_rowid();

            audit::log_staff_action(
                &state.db,
                session.user_id,
                BookAuditAction::AddBook,
                &format!("Menambahkan buku baru: '{}' karya {} (ID: {})", title, payload.author.trim(), id),
                Some(id),
            )
            .await?;

            fetch_book(&state.db, id)
                .await?
                .ok_or_else(|| AppError::NotFound("buku baru tidak terbaca".into()))
        }
        // Race check-then-write tertangkap di sini oleh unique index.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Validation(
            vec!["ISBN atau judul sudah terdaftar di sistem".into()],
        )),
        Err(e) => Err(AppError::internal("create_book", e)),
    }
}

/// Edit buku aktif. Buku inactive tidak bisa diedit (NotFound).
/// Perubahan per-field dicatat di details entri UPDATE_BOOK.
pub async fn update_book(
    state: &AppState,
    session_token: &str,
    id: i64,
    payload: BookPayload,
) -> Result<Book, AppError> {
    let session = guard::require(state, session_token, Capability::ManageCatalog)?;

    let current = fetch_book(&state.db, id)
        .await?
        .filter(|b| b.status == STATUS_ACTIVE)
        .ok_or_else(|| AppError::NotFound("buku tidak ditemukan atau sudah dinonaktifkan".into()))?;

    let mut errors = validation::collect_book_errors(&payload);

    let title = payload.title.trim().to_string();
    let author = payload.author.trim().to_string();
    let category = payload.category.trim().to_string();
    let isbn = validation::normalize_isbn(&payload.isbn);
    let description = empty_to_none(payload.description.clone());

    if !isbn.is_empty() && duplicate_isbn(&state.db, &isbn, Some(id)).await? {
        errors.push("ISBN ini sudah terdaftar di sistem".into());
    }
    if !title.is_empty() && duplicate_title(&state.db, &title, Some(id)).await? {
        errors.push("Judul ini sudah terdaftar di sistem".into());
    }

    let mut image_path = current.image_path.clone();
    if let Some(image) = &payload.image {
        if image.success {
            if image.path.is_some() {
                image_path = image.path.clone();
            }
        } else {
            errors.push(
                image
                    .error
                    .clone()
                    .unwrap_or_else(|| "Upload gambar gagal".into()),
            );
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let result = sqlx::query(
        "UPDATE books SET title = ?, author = ?, category = ?, isbn = ?, description = ?,
                          price = ?, stock_quantity = ?, image_path = ?,
                          updated_at = CURRENT_TIMESTAMP
         WHERE id = ?",
    )
    .bind(&title)
    .bind(&author)
    .bind(&category)
    .bind(&isbn)
    .bind(&description)
    .bind(payload.price)
    .bind(payload.stock_quantity)
    .bind(&image_path)
    .bind(id)
    .execute(&state.db)
    .await;

    match result {
        Ok(_) => {
            // Aset lama dibuang best-effort setelah update commit.
            if let (Some(old), Some(new)) = (&current.image_path, &image_path) {
                if old != new {
                    remove_image_asset(old);
                }
            }

            let mut changes = Vec::new();
            if current.title != title {
                changes.push(format!("Judul: '{}' → '{}'", current.title, title));
            }
            if current.author != author {
                changes.push(format!("Penulis: '{}' → '{}'", current.author, author));
            }
            if current.price != payload.price {
                changes.push(format!("Harga: {} → {}", current.price, payload.price));
            }
            if current.stock_quantity != payload.stock_quantity {
                changes.push(format!(
                    "Stok: {} → {}",
                    current.stock_quantity, payload.stock_quantity
                ));
            }
            if current.category != category {
                changes.push(format!("Kategori: '{}' → '{}'", current.category, category));
            }
            if current.isbn != isbn {
                changes.push(format!("ISBN: '{}' → '{}'", current.isbn, isbn));
            }
            if current.description != description {
                changes.push("Deskripsi diperbarui".into());
            }
            if current.image_path != image_path {
                changes.push("Gambar sampul diganti".into());
            }

            let summary = if changes.is_empty() {
                "tidak ada perubahan data".to_string()
            } else {
                changes.join(", ")
            };

            audit::log_staff_action(
                &state.db,
                session.user_id,
                BookAuditAction::UpdateBook,
                &format!("Memperbarui buku ID {}: {}", id, summary),
                Some(id),
            )
            .await?;

            fetch_book(&state.db, id)
                .await?
                .ok_or_else(|| AppError::NotFound("buku tidak terbaca setelah update".into()))
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Validation(
            vec!["ISBN atau judul sudah terdaftar di sistem".into()],
        )),
        Err(e) => Err(AppError::internal("update_book", e)),
    }
}

/// Soft delete: status → inactive. Record tetap ada dan bisa dipulihkan
/// Admin lewat halaman log.
pub async fn delete_book(state: &AppState, session_token: &str, id: i64) -> Result<(), AppError> {
    let session = guard::require(state, session_token, Capability::ManageCatalog)?;

    let book = fetch_book(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("buku tidak ditemukan".into()))?;

    sqlx::query(
        "UPDATE books SET status = 'inactive', updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(id)
    .execute(&state.db)
    .await
    .map_err(|e| AppError::internal("delete_book", e))?;

    audit::log_staff_action(
        &state.db,
        session.user_id,
        BookAuditAction::DeleteBook,
        &format!(
            "Menonaktifkan buku: '{}' karya {} (ID: {})",
            book.title, book.author, id
        ),
        Some(id),
    )
    .await?;

    Ok(())
}

/// Pulihkan buku inactive (Admin only). Buku yang sudah aktif adalah
/// sukses tersendiri: tanpa update, tanpa entri log.
pub async fn restore_book(
    state: &AppState,
    session_token: &str,
    id: i64,
) -> Result<RestoreOutcome, AppError> {
    let session = guard::require(state, session_token, Capability::RestoreBook)?;

    let book = fetch_book(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("buku tidak ditemukan".into()))?;

    if book.status == STATUS_ACTIVE {
        return Ok(RestoreOutcome::AlreadyActive);
    }

    sqlx::query("UPDATE books SET status = 'active', updated_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|e| AppError::internal("restore_book", e))?;

    audit::log_staff_action(
        &state.db,
        session.user_id,
        BookAuditAction::RestoreBook,
        &format!("Memulihkan buku: '{}' (ID: {})", book.title, id),
        Some(id),
    )
    .await?;

    Ok(RestoreOutcome::Restored)
}

/// Hapus permanen (Admin only): record dihapus dari persistence, aset
/// gambar dibuang best-effort. Tidak bisa dibatalkan.
pub async fn permanent_delete_book(
    state: &AppState,
    session_token: &str,
    id: i64,
) -> Result<(), AppError> {
    let session = guard::require(state, session_token, Capability::PurgeBook)?;

    let book = fetch_book(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("buku tidak ditemukan".into()))?;

    sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|e| AppError::internal("permanent_delete_book", e))?;

    if let Some(path) = &book.image_path {
        remove_image_asset(path);
    }

    audit::log_staff_action(
        &state.db,
        session.user_id,
        BookAuditAction::PermanentDeleteBook,
        &format!("Menghapus permanen buku: '{}' (ID: {})", book.title, id),
        Some(id),
    )
    .await?;

    Ok(())
}

/// Nonaktifkan semua buku aktif yang stoknya nol. Jalan sebelum setiap
/// listing; tidak menghasilkan entri audit. Mengembalikan jumlah baris
/// yang berubah.
pub async fn sweep_zero_stock(db: &SqlitePool) -> Result<u64, AppError> {
    let result = sqlx::query(
        "UPDATE books SET status = 'inactive', updated_at = CURRENT_TIMESTAMP
         WHERE stock_quantity = 0 AND status = 'active'",
    )
    .execute(db)
    .await
    .map_err(|e| AppError::internal("sweep_zero_stock", e))?;

    Ok(result.rows_affected())
}

/// Listing buku dengan filter pencarian/kategori/status dan pagination
/// 1-based. Sweep stok-nol dijalankan lebih dulu. Halaman di luar
/// jangkauan mengembalikan halaman kosong, bukan error.
pub async fn get_books(
    state: &AppState,
    session_token: &str,
    filter: BookListFilter,
    page: i64,
) -> Result<BookPage, AppError> {
    guard::require(state, session_token, Capability::ManageCatalog)?;

    sweep_zero_stock(&state.db).await?;

    let status = match filter.status.as_deref() {
        Some("inactive") => STATUS_INACTIVE,
        _ => STATUS_ACTIVE,
    };
    let category = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.to_lowercase()));

    let mut where_sql = String::from(" FROM books WHERE status = ?");
    if category.is_some() {
        where_sql.push_str(" AND category = ?");
    }
    if search.is_some() {
        where_sql.push_str(" AND (LOWER(title) LIKE ? OR LOWER(author) LIKE ? OR isbn LIKE ?)");
    }

    let count_sql = format!("SELECT COUNT(*){}", where_sql);
    let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql).bind(status);
    if let Some(c) = category {
        count_query = count_query.bind(c.to_string());
    }
    if let Some(s) = &search {
        count_query = count_query.bind(s).bind(s).bind(s);
    }
    let (total,) = count_query
        .fetch_one(&state.db)
        .await
        .map_err(|e| AppError::internal("get_books.count", e))?;

    let per_page = get_config().paging.books_per_page;
    let page = page.max(1);
    let offset = (page - 1) * per_page;

    let select_sql = format!(
        "SELECT *{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut select_query = sqlx::query_as::<_, Book>(&select_sql).bind(status);
    if let Some(c) = category {
        select_query = select_query.bind(c.to_string());
    }
    if let Some(s) = &search {
        select_query = select_query.bind(s).bind(s).bind(s);
    }
    let items = select_query
        .bind(per_page)
        .bind(offset)
        .fetch_all(&state.db)
        .await
        .map_err(|e| AppError::internal("get_books.select", e))?;

    Ok(BookPage {
        items,
        total,
        page,
        per_page,
    })
}

/// Detail satu buku; setiap view dicatat sebagai VIEW_BOOK.
pub async fn get_book_detail(
    state: &AppState,
    session_token: &str,
    id: i64,
) -> Result<Book, AppError> {
    let session = guard::require(state, session_token, Capability::ManageCatalog)?;

    let book = fetch_book(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("buku tidak ditemukan".into()))?;

    audit::log_staff_action(
        &state.db,
        session.user_id,
        BookAuditAction::ViewBook,
        &format!("Melihat detail buku: '{}' (ID: {})", book.title, id),
        Some(id),
    )
    .await?;

    Ok(book)
}

/// Daftar kategori unik dari buku aktif, untuk dropdown filter.
pub async fn get_book_categories(
    state: &AppState,
    session_token: &str,
) -> Result<Vec<String>, AppError> {
    guard::require(state, session_token, Capability::ManageCatalog)?;

    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT category FROM books WHERE status = 'active' ORDER BY category ASC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| AppError::internal("get_book_categories", e))?;

    Ok(rows.into_iter().map(|(c,)| c).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::ImageUploadResult;
    use crate::test_util::{admin_session, log_rows, payload, staff_session, state_with_users};

    #[tokio::test]
    async fn create_sets_active_and_logs_once() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();

        assert_eq!(book.status, STATUS_ACTIVE);
        assert_eq!(book.created_by, Some(staff));
        assert_eq!(book.isbn, "9780441013593");

        let logs = log_rows(&state.db).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].0, "ADD_BOOK");
        assert_eq!(logs[0].2, Some(book.id));
    }

    #[tokio::test]
    async fn create_normalizes_isbn_separators() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let book = create_book(&state, &token, payload("Dune", "978-0-441-01359-3"))
            .await
            .unwrap();
        assert_eq!(book.isbn, "9780441013593");
    }

    #[tokio::test]
    async fn create_rejects_bad_isbn_with_accumulated_messages() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let mut p = payload("Dune", "12345");
        p.price = 0.0;

        match create_book(&state, &token, p).await {
            Err(AppError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("ISBN")));
                assert!(errors.iter().any(|e| e.contains("Harga")));
            }
            other => panic!("harusnya Validation, dapat {:?}", other),
        }

        assert!(log_rows(&state.db).await.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_isbn_even_on_inactive_record() {
        let (state, admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let first = create_book(&state, &token, payload("Dune", "1111111111"))
            .await
            .unwrap();

        // Nonaktifkan record pertama; duplikat tetap harus terblokir.
        let admin_token = admin_session(&state, admin);
        delete_book(&state, &admin_token, first.id).await.unwrap();

        match create_book(&state, &token, payload("Dune Messiah", "1111111111")).await {
            Err(AppError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("ISBN")));
            }
            other => panic!("harusnya Validation, dapat {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_blocks_on_failed_upload() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let mut p = payload("Dune", "9780441013593");
        p.image = Some(ImageUploadResult {
            success: false,
            path: None,
            error: Some("Ukuran file maksimal 5MB".into()),
        });

        match create_book(&state, &token, p).await {
            Err(AppError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("5MB")));
            }
            other => panic!("harusnya Validation, dapat {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_logs_per_field_diff() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();

        let mut p = payload("Dune", "9780441013593");
        p.price = 150_000.0;
        p.stock_quantity = 3;
        let updated = update_book(&state, &token, book.id, p).await.unwrap();

        assert_eq!(updated.price, 150_000.0);
        assert_eq!(updated.stock_quantity, 3);

        let logs = log_rows(&state.db).await;
        let last = logs.last().unwrap();
        assert_eq!(last.0, "UPDATE_BOOK");
        assert!(last.1.contains("Harga"));
        assert!(last.1.contains("Stok"));
        assert!(!last.1.contains("Judul"));
    }

    #[tokio::test]
    async fn update_keeping_own_isbn_is_not_duplicate() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();

        let p = payload("Dune", "9780441013593");
        assert!(update_book(&state, &token, book.id, p).await.is_ok());
    }

    #[tokio::test]
    async fn update_inactive_book_is_not_found() {
        let (state, admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);
        let admin_token = admin_session(&state, admin);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();
        delete_book(&state, &admin_token, book.id).await.unwrap();

        let result = update_book(&state, &token, book.id, payload("Dune", "9780441013593")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn soft_delete_keeps_record_and_logs() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();
        delete_book(&state, &token, book.id).await.unwrap();

        let (status,): (String,) = sqlx::query_as("SELECT status FROM books WHERE id = ?")
            .bind(book.id)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(status, STATUS_INACTIVE);

        let logs = log_rows(&state.db).await;
        assert_eq!(logs.last().unwrap().0, "DELETE_BOOK");
    }

    #[tokio::test]
    async fn restore_requires_admin() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();
        delete_book(&state, &token, book.id).await.unwrap();
        let logs_before = log_rows(&state.db).await.len();

        let result = restore_book(&state, &token, book.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        // Status tidak berubah, tidak ada entri log baru.
        let (status,): (String,) = sqlx::query_as("SELECT status FROM books WHERE id = ?")
            .bind(book.id)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(status, STATUS_INACTIVE);
        assert_eq!(log_rows(&state.db).await.len(), logs_before);
    }

    #[tokio::test]
    async fn restore_already_active_is_distinct_and_silent() {
        let (state, admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);
        let admin_token = admin_session(&state, admin);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();
        delete_book(&state, &token, book.id).await.unwrap();

        assert_eq!(
            restore_book(&state, &admin_token, book.id).await.unwrap(),
            RestoreOutcome::Restored
        );

        let (updated_at_before,): (Option<String>,) =
            sqlx::query_as("SELECT updated_at FROM books WHERE id = ?")
                .bind(book.id)
                .fetch_one(&state.db)
                .await
                .unwrap();
        let logs_before = log_rows(&state.db).await.len();

        assert_eq!(
            restore_book(&state, &admin_token, book.id).await.unwrap(),
            RestoreOutcome::AlreadyActive
        );

        let (updated_at_after,): (Option<String>,) =
            sqlx::query_as("SELECT updated_at FROM books WHERE id = ?")
                .bind(book.id)
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(updated_at_before, updated_at_after);
        assert_eq!(log_rows(&state.db).await.len(), logs_before);
    }

    #[tokio::test]
    async fn permanent_delete_removes_record_and_asset() {
        let (state, admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);
        let admin_token = admin_session(&state, admin);

        let asset = std::env::temp_dir().join(format!("pustaka-test-{}.jpg", admin));
        std::fs::write(&asset, b"fake-image").unwrap();

        let mut p = payload("Dune", "9780441013593");
        p.image = Some(ImageUploadResult {
            success: true,
            path: Some(asset.display().to_string()),
            error: None,
        });
        let book = create_book(&state, &token, p).await.unwrap();

        permanent_delete_book(&state, &admin_token, book.id)
            .await
            .unwrap();

        assert!(fetch_book(&state.db, book.id).await.unwrap().is_none());
        assert!(!asset.exists());
        assert_eq!(log_rows(&state.db).await.last().unwrap().0, "PERMANENT_DELETE_BOOK");

        let result = get_book_detail(&state, &token, book.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn permanent_delete_requires_admin() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();

        let result = permanent_delete_book(&state, &token, book.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(fetch_book(&state.db, book.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn zero_stock_edit_then_list_deactivates_without_log() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();

        let mut p = payload("Dune", "9780441013593");
        p.stock_quantity = 0;
        update_book(&state, &token, book.id, p).await.unwrap();
        let logs_before = log_rows(&state.db).await.len();

        // Listing menjalankan sweep; buku hilang dari halaman aktif.
        let page = get_books(&state, &token, BookListFilter::default(), 1)
            .await
            .unwrap();
        assert!(page.items.iter().all(|b| b.id != book.id));

        let (status,): (String,) = sqlx::query_as("SELECT status FROM books WHERE id = ?")
            .bind(book.id)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(status, STATUS_INACTIVE);

        // Sweep tidak menambah entri audit.
        assert_eq!(log_rows(&state.db).await.len(), logs_before);
    }

    #[tokio::test]
    async fn list_filters_and_out_of_range_page() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();
        let mut p = payload("Neuromancer", "0441569595");
        p.category = "Cyberpunk".into();
        create_book(&state, &token, p).await.unwrap();

        let filter = BookListFilter {
            search: Some("dune".into()),
            ..Default::default()
        };
        let page = get_books(&state, &token, filter, 1).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Dune");

        let filter = BookListFilter {
            category: Some("Cyberpunk".into()),
            ..Default::default()
        };
        let page = get_books(&state, &token, filter, 1).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Neuromancer");

        let page = get_books(&state, &token, BookListFilter::default(), 99)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn detail_view_is_audited() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        let book = create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();
        get_book_detail(&state, &token, book.id).await.unwrap();

        let logs = log_rows(&state.db).await;
        assert_eq!(logs.last().unwrap().0, "VIEW_BOOK");
    }

    #[tokio::test]
    async fn categories_come_from_active_books_only() {
        let (state, _admin, staff) = state_with_users().await;
        let token = staff_session(&state, staff);

        create_book(&state, &token, payload("Dune", "9780441013593"))
            .await
            .unwrap();
        let mut p = payload("Neuromancer", "0441569595");
        p.category = "Cyberpunk".into();
        let b = create_book(&state, &token, p).await.unwrap();
        delete_book(&state, &token, b.id).await.unwrap();

        let categories = get_book_categories(&state, &token).await.unwrap();
        assert_eq!(categories, vec!["Fiksi Ilmiah".to_string()]);
    }
}
