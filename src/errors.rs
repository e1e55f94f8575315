use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Sesi tidak valid: {0}")]
    Auth(String),

    #[error("Akses ditolak: {0}")]
    Forbidden(String),

    #[error("Data tidak ditemukan: {0}")]
    NotFound(String),

    /// Daftar pesan validasi, urut sesuai field. Pesan duplikat ISBN/judul
    /// dan error upload gambar ikut terkumpul di sini.
    #[error("Validasi gagal: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Catat error persistence secara lengkap untuk diagnosa operator,
    /// kembalikan satu pesan generik ke pemanggil.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        crate::log_error!("DATABASE", context, err.to_string());
        AppError::Internal("Terjadi kesalahan internal. Silakan coba lagi.".into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(vec![msg.into()])
    }
}
