/// 缓存键模块
/// 提供各种缓存键生成函数

// 用户缓存键模块
pub mod user_keys;

// 文件缓存键模块
pub mod file_keys;

use std::fmt::Display;

// 重新导出常用的键生成函数
pub use file_keys::{file_key, owner_key};
pub use user_keys::{email_key, user_key};

/// 实体哈希键，形如 `user:1`
pub fn entity_key(prefix: &str, id: i64) -> String {
    format!("{}:{}", prefix, id)
}

/// 索引集合键，形如 `email:a@b.c`、`owner_id:7`
pub fn index_key(field: &str, value: impl Display) -> String {
    format!("{}:{}", field, value)
}
