//! Query audit log untuk halaman aktivitas staf: listing berfilter,
//! opsi dropdown, resolver aksi per-entri, dan ringkasan statistik.

use crate::audit::{self, LogActions};
use crate::auth::guard::{self, Capability};
use crate::config::get_config;
use crate::errors::AppError;
use crate::models::staff_log::{LogFilter, LogPage, LogStats, StaffLogWithUser, StaffOption};
use crate::models::user::ROLE_STAFF;
use crate::AppState;

/// Listing log dengan filter staf/aksi/rentang tanggal, terbaru dulu.
/// Filter tanggal inklusif dan membandingkan tanggal kalender dari
/// timestamp, bukan timestamp mentah.
pub async fn get_staff_logs(
    state: &AppState,
    session_token: &str,
    filter: LogFilter,
    page: i64,
) -> Result<LogPage, AppError> {
    guard::require(state, session_token, Capability::ViewLogs)?;

    let action_type = filter
        .action_type
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    let date_from = filter
        .date_from
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let date_to = filter
        .date_to
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let mut where_sql =
        String::from(" FROM staff_logs sl JOIN users u ON u.id = sl.staff_id WHERE 1=1");
    if filter.staff_id.is_some() {
        where_sql.push_str(" AND sl.staff_id = ?");
    }
    if action_type.is_some() {
        where_sql.push_str(" AND sl.action_type = ?");
    }
    if date_from.is_some() {
        where_sql.push_str(" AND DATE(sl.timestamp) >= ?");
    }
    if date_to.is_some() {
        where_sql.push_str(" AND DATE(sl.timestamp) <= ?");
    }

    let count_sql = format!("SELECT COUNT(*){}", where_sql);
    let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
    if let Some(id) = filter.staff_id {
        count_query = count_query.bind(id);
    }
    if let Some(a) = action_type {
        count_query = count_query.bind(a.to_string());
    }
    if let Some(d) = date_from {
        count_query = count_query.bind(d.to_string());
    }
    if let Some(d) = date_to {
        count_query = count_query.bind(d.to_string());
    }
    let (total,) = count_query
        .fetch_one(&state.db)
        .await
        .map_err(|e| AppError::internal("get_staff_logs.count", e))?;

    let per_page = get_config().paging.logs_per_page;
    let page = page.max(1);
    let offset = (page - 1) * per_page;

    let select_sql = format!(
        "SELECT sl.id, sl.staff_id, u.full_name, u.username, sl.action_type,
                sl.details, sl.related_book_id, sl.timestamp{}
         ORDER BY sl.timestamp DESC, sl.id DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut select_query = sqlx::query_as::<_, StaffLogWithUser>(&select_sql);
    if let Some(id) = filter.staff_id {
        select_query = select_query.bind(id);
    }
    if let Some(a) = action_type {
        select_query = select_query.bind(a.to_string());
    }
    if let Some(d) = date_from {
        select_query = select_query.bind(d.to_string());
    }
    if let Some(d) = date_to {
        select_query = select_query.bind(d.to_string());
    }
    let items = select_query
        .bind(per_page)
        .bind(offset)
        .fetch_all(&state.db)
        .await
        .map_err(|e| AppError::internal("get_staff_logs.select", e))?;

    Ok(LogPage {
        items,
        total,
        page,
        per_page,
    })
}

/// Aksi reversal yang ditawarkan untuk satu entri log. None bila entri
/// tidak mereferensikan buku atau bukunya sudah dihapus permanen.
pub async fn get_log_actions(
    state: &AppState,
    session_token: &str,
    log_id: i64,
) -> Result<Option<LogActions>, AppError> {
    let session = guard::require(state, session_token, Capability::ViewLogs)?;

    let row: Option<(Option<i64>, String)> =
        sqlx::query_as("SELECT related_book_id, details FROM staff_logs WHERE id = ?")
            .bind(log_id)
            .fetch_optional(&state.db)
            .await
            .map_err(|e| AppError::internal("get_log_actions", e))?;

    let (related_book_id, details) =
        row.ok_or_else(|| AppError::NotFound("entri log tidak ditemukan".into()))?;

    audit::resolve_log_actions(&state.db, related_book_id, &details, &session.role).await
}

/// Opsi dropdown filter staf. Mengikuti halaman log: hanya akun
/// ber-role Staff, urut nama.
pub async fn get_log_staff_options(
    state: &AppState,
    session_token: &str,
) -> Result<Vec<StaffOption>, AppError> {
    guard::require(state, session_token, Capability::ViewLogs)?;

    sqlx::query_as::<_, StaffOption>(
        "SELECT id, full_name, username FROM users WHERE role = ? ORDER BY full_name ASC",
    )
    .bind(ROLE_STAFF)
    .fetch_all(&state.db)
    .await
    .map_err(|e| AppError::internal("get_log_staff_options", e))
}

/// Opsi dropdown filter jenis aksi, dari aksi yang benar-benar pernah
/// tercatat.
pub async fn get_log_action_types(
    state: &AppState,
    session_token: &str,
) -> Result<Vec<String>, AppError> {
    guard::require(state, session_token, Capability::ViewLogs)?;

    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT action_type FROM staff_logs ORDER BY action_type ASC",
    )
    .fetch_all(&state.db)
    .await
    .map_err(|e| AppError::internal("get_log_action_types", e))?;

    Ok(rows.into_iter().map(|(a,)| a).collect())
}

/// Ringkasan untuk panel statistik di atas tabel log.
pub async fn get_log_stats(state: &AppState, session_token: &str) -> Result<LogStats, AppError> {
    guard::require(state, session_token, Capability::ViewLogs)?;

    let (today_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM staff_logs WHERE DATE(timestamp) = DATE('now')")
            .fetch_one(&state.db)
            .await
            .map_err(|e| AppError::internal("get_log_stats.today", e))?;

    let (week_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM staff_logs
         WHERE strftime('%Y-%W', timestamp) = strftime('%Y-%W', 'now')",
    )
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::internal("get_log_stats.week", e))?;

    let most_active_staff_today: Option<(String,)> = sqlx::query_as(
        "SELECT u.full_name FROM staff_logs sl JOIN users u ON u.id = sl.staff_id
         WHERE DATE(sl.timestamp) = DATE('now')
         GROUP BY sl.staff_id ORDER BY COUNT(*) DESC LIMIT 1",
    )
    .fetch_optional(&state.db)
    .await
    .map_err(|e| AppError::internal("get_log_stats.staff", e))?;

    let most_common_action_today: Option<(String,)> = sqlx::query_as(
        "SELECT action_type FROM staff_logs
         WHERE DATE(timestamp) = DATE('now')
         GROUP BY action_type ORDER BY COUNT(*) DESC LIMIT 1",
    )
    .fetch_optional(&state.db)
    .await
    .map_err(|e| AppError::internal("get_log_stats.action", e))?;

    Ok(LogStats {
        today_count,
        week_count,
        most_active_staff_today: most_active_staff_today.map(|(n,)| n),
        most_common_action_today: most_common_action_today.map(|(a,)| a),
    })
}
