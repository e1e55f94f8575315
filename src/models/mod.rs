pub mod book;
pub mod staff_log;
pub mod user;
