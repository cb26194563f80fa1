/// 缓存存储适配层
/// 只提供键值存储的基础命令，不包含任何实体相关逻辑
pub mod memory;
pub mod redis_store;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::error::CacheResult;

pub use self::memory::MemoryCacheStore;
pub use self::redis_store::RedisCacheStore;

/// 缓存存储的基础命令
///
/// 每个命令单独是原子的，多个命令之间没有事务保证。
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 设置哈希的多个字段
    async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> CacheResult<()>;

    /// 读取哈希的全部字段，键不存在时返回空表
    async fn hgetall(&self, key: &str) -> CacheResult<HashMap<String, String>>;

    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>>;

    async fn sadd(&self, key: &str, member: &str) -> CacheResult<()>;

    async fn srem(&self, key: &str, member: &str) -> CacheResult<()>;

    /// 集合基数，键不存在时为 0
    async fn scard(&self, key: &str) -> CacheResult<u64>;

    async fn smembers(&self, key: &str) -> CacheResult<Vec<String>>;

    async fn del(&self, keys: &[String]) -> CacheResult<()>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()>;

    /// 清空整个库，只给测试使用
    async fn flush(&self) -> CacheResult<()>;
}
