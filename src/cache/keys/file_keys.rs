use super::{entity_key, index_key};

/// 文件哈希键前缀
pub const FILE_PREFIX: &str = "file";

/// 文件索引字段，同时是所有者集合键前缀
pub const OWNER_FIELD: &str = "owner_id";

/// 生成文件信息缓存键
pub fn file_key(file_id: i64) -> String {
    entity_key(FILE_PREFIX, file_id)
}

/// 生成所有者索引集合键
pub fn owner_key(owner_id: i64) -> String {
    index_key(OWNER_FIELD, owner_id)
}
