use sqlx::SqlitePool;

/// Menjalankan semua migrasi database (CREATE TABLE IF NOT EXISTS + index).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // ═══════════════════════════════════════
    // TABLE: users
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id         INTEGER  PRIMARY KEY AUTOINCREMENT,
            full_name  TEXT     NOT NULL,
            username   TEXT     NOT NULL UNIQUE,
            role       TEXT     NOT NULL CHECK(role IN ('Staff', 'Admin')),
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)")
        .execute(pool)
        .await?;

    // ═══════════════════════════════════════
    // TABLE: books
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS books (
            id             INTEGER  PRIMARY KEY AUTOINCREMENT,
            title          TEXT     NOT NULL,
            author         TEXT     NOT NULL,
            category       TEXT     NOT NULL,
            isbn           TEXT     NOT NULL,
            description    TEXT,
            price          REAL     NOT NULL CHECK(price > 0),
            stock_quantity INTEGER  NOT NULL DEFAULT 0 CHECK(stock_quantity >= 0),
            image_path     TEXT,
            status         TEXT     NOT NULL DEFAULT 'active'
                           CHECK(status IN ('active', 'inactive')),
            created_by     INTEGER  REFERENCES users(id) ON DELETE SET NULL,
            created_at     DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at     DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    // Keunikan isbn/judul ditegakkan di storage layer, berlaku untuk SEMUA
    // baris tanpa memandang status. Pre-check di application layer hanya
    // untuk pesan error yang lebih ramah.
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_books_isbn ON books(isbn)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_books_title ON books(title)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_books_status ON books(status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_books_category ON books(category)")
        .execute(pool)
        .await?;

    // ═══════════════════════════════════════
    // TABLE: staff_logs (Audit Trail, append-only)
    // ═══════════════════════════════════════
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS staff_logs (
            id          INTEGER  PRIMARY KEY AUTOINCREMENT,
            staff_id    INTEGER  NOT NULL REFERENCES users(id),
            action_type TEXT     NOT NULL, -- 'ADD_BOOK', 'DELETE_BOOK', etc.
            details     TEXT     NOT NULL,
            timestamp   DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_staff_logs_timestamp ON staff_logs(timestamp)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_staff_logs_staff ON staff_logs(staff_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_staff_logs_action ON staff_logs(action_type)")
        .execute(pool)
        .await?;

    // ═══════════════════════════════════════
    // MIGRASI: Kolom baru (ALTER TABLE — aman untuk data existing)
    // ═══════════════════════════════════════

    // Referensi buku terstruktur pada log; entri lama tetap di-resolve
    // dari teks details. Bukan FK supaya entri tetap utuh setelah purge.
    safe_add_column(pool, "staff_logs", "related_book_id", "INTEGER").await;

    Ok(())
}

/// Helper: ALTER TABLE ADD COLUMN yang aman (abaikan jika kolom sudah ada).
async fn safe_add_column(pool: &SqlitePool, table: &str, column: &str, col_type: &str) {
    let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, col_type);
    match sqlx::query(&sql).execute(pool).await {
        Ok(_) => {}
        Err(e) => {
            let msg = e.to_string();
            // SQLite error jika kolom sudah ada: "duplicate column name"
            if !msg.contains("duplicate column") {
                eprintln!("Migration warning: {}", msg);
            }
        }
    }
}
