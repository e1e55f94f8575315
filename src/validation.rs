//! Validasi input form buku
//!
//! Error TIDAK short-circuit: semua pesan dikumpulkan dan dilaporkan
//! sekaligus. Persistence hanya dicoba bila daftar error kosong.

use crate::models::book::BookPayload;

/// Validation result type
pub type ValidationResult = Result<(), String>;

/// Field wajib: tidak boleh kosong setelah trim.
pub fn validate_required(value: &str, field_name: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(format!("{} tidak boleh kosong", field_name));
    }
    Ok(())
}

/// Kategori minimal 2 karakter setelah trim.
pub fn validate_category(category: &str) -> ValidationResult {
    let trimmed = category.trim();

    if trimmed.is_empty() {
        return Err("Kategori tidak boleh kosong".into());
    }

    if trimmed.chars().count() < 2 {
        return Err("Kategori minimal 2 karakter".into());
    }

    Ok(())
}

/// Harga harus angka valid dan lebih dari 0.
pub fn validate_price(price: f64) -> ValidationResult {
    if price.is_nan() || price.is_infinite() || price <= 0.0 {
        return Err("Harga harus lebih dari 0".into());
    }
    Ok(())
}

/// Stok tidak boleh negatif.
pub fn validate_stock(stock: i64) -> ValidationResult {
    if stock < 0 {
        return Err("Stok tidak boleh negatif".into());
    }
    Ok(())
}

/// Buang tanda hubung dan spasi dari ISBN.
pub fn normalize_isbn(isbn: &str) -> String {
    isbn.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
}

/// ISBN harus tepat 10 atau 13 digit angka setelah normalisasi.
pub fn validate_isbn(isbn: &str) -> ValidationResult {
    let normalized = normalize_isbn(isbn);

    if normalized.len() != 10 && normalized.len() != 13 {
        return Err("ISBN harus terdiri dari 10 atau 13 digit".into());
    }

    if !normalized.chars().all(|c| c.is_ascii_digit()) {
        return Err("ISBN hanya boleh berisi angka".into());
    }

    Ok(())
}

/// Kumpulkan semua error validasi field untuk tambah/edit buku.
/// Pesan duplikat dan error upload ditambahkan pemanggil.
pub fn collect_book_errors(payload: &BookPayload) -> Vec<String> {
    let mut errors = Vec::new();

    let checks = [
        validate_required(&payload.title, "Judul"),
        validate_required(&payload.author, "Penulis"),
        validate_category(&payload.category),
        validate_required(&payload.isbn, "ISBN"),
        validate_price(payload.price),
        validate_stock(payload.stock_quantity),
    ];

    for check in checks {
        if let Err(msg) = check {
            errors.push(msg);
        }
    }

    // Format ISBN hanya dicek bila field terisi; pesan "kosong" sudah ada.
    if !payload.isbn.trim().is_empty() {
        if let Err(msg) = validate_isbn(&payload.isbn) {
            errors.push(msg);
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::BookPayload;

    fn payload() -> BookPayload {
        BookPayload {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            category: "Fiksi Ilmiah".into(),
            isbn: "9780441013593".into(),
            description: None,
            price: 120_000.0,
            stock_quantity: 5,
            image: None,
        }
    }

    #[test]
    fn valid_payload_has_no_errors() {
        assert!(collect_book_errors(&payload()).is_empty());
    }

    #[test]
    fn isbn_accepts_10_and_13_digits_with_separators() {
        assert!(validate_isbn("0441013597").is_ok());
        assert!(validate_isbn("978-0-441-01359-3").is_ok());
        assert!(validate_isbn("978 0441 013593").is_ok());
    }

    #[test]
    fn isbn_rejects_wrong_length_and_non_digits() {
        assert!(validate_isbn("12345").is_err());
        assert!(validate_isbn("123456789012").is_err());
        assert!(validate_isbn("97804410135XX").is_err());
    }

    #[test]
    fn errors_accumulate_in_field_order() {
        let mut p = payload();
        p.title = "  ".into();
        p.category = "A".into();
        p.price = 0.0;
        p.stock_quantity = -1;
        p.isbn = "123".into();

        let errors = collect_book_errors(&p);
        assert_eq!(errors.len(), 5);
        assert!(errors[0].contains("Judul"));
        assert!(errors[1].contains("Kategori"));
        assert!(errors[2].contains("Harga"));
        assert!(errors[3].contains("Stok"));
        assert!(errors[4].contains("ISBN"));
    }

    #[test]
    fn price_rejects_nan_and_zero() {
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(0.0).is_err());
        assert!(validate_price(0.01).is_ok());
    }
}
