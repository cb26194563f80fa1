/// 缓存层错误
///
/// 缓存只是加速层，这里的任何错误都不应该传递到 API 层，
/// 调用方据此决定回退到数据库。
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// 没有可用连接（未连接或已断开）
    #[error("cache connection is not available")]
    Unavailable,

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// 缓存中的快照无法解析
    #[error("failed to decode cached snapshot: {0}")]
    Decode(#[from] serde_json::Error),

    /// 快照版本与当前实体结构不一致
    #[error("cached snapshot has schema version {found}, expected {expected}")]
    SchemaMismatch { expected: u32, found: u32 },

    /// 唯一索引集合里出现了多个成员
    #[error("index {key} is expected to hold one member but holds {members}")]
    IndexViolation { key: String, members: usize },

    #[error("key {key} holds a value of the wrong type")]
    WrongType { key: String },
}

pub type CacheResult<T> = Result<T, CacheError>;

impl CacheError {
    /// 快照本身有问题（而非连接问题），对应条目应当删除
    pub fn is_corrupt_entry(&self) -> bool {
        matches!(self, CacheError::Decode(_) | CacheError::SchemaMismatch { .. })
    }
}
