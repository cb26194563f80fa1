// 业务编排模块
// 数据库写入后同步维护缓存，缓存失败只记录日志

pub mod cascade;
pub mod file;
pub mod user;

pub use cascade::{CascadeDelete, CascadeReport};
pub use file::FileOperations;
pub use user::UserOperations;

use crate::error::AppError;

/// 记录不存在映射为 404
pub(crate) fn not_found(e: sqlx::Error, msg: &str) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::NotFound(msg.to_string()),
        other => AppError::Database(other),
    }
}

/// 唯一约束冲突（PostgreSQL 23505）映射为 409
pub(crate) fn unique_conflict(e: sqlx::Error, msg: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            tracing::debug!("Unique violation: {}", db.message());
            AppError::Conflict(msg.to_string())
        }
        other => AppError::Database(other),
    }
}

pub(crate) fn store_error(e: sqlx::Error, missing: &str, conflict: &str) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::NotFound(missing.to_string()),
        other => unique_conflict(other, conflict),
    }
}
