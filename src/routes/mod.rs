pub mod file;
pub mod login;
pub mod user;
