pub mod book_cmd;
pub mod log_cmd;
