// PostgreSQL 存储库
pub mod file;
pub mod user;
