/// 缓存数据模型
/// 定义可缓存实体的约定和快照编码
pub mod snapshot;

// 用户缓存模型
pub mod user;

// 文件缓存模型
pub mod file;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use snapshot::{decode_snapshot, encode_snapshot};

/// 可缓存实体
///
/// 每种实体在缓存中占一个哈希 `{ENTITY}:{id}`，并通过集合
/// `{INDEX_FIELD}:{index}` 建立二级索引。
pub trait CacheEntity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// 哈希键前缀
    const ENTITY: &'static str;
    /// 二级索引字段名，同时是索引集合键前缀
    const INDEX_FIELD: &'static str;
    /// 快照结构版本，结构变化时递增
    const SCHEMA_VERSION: u32;

    fn entity_id(&self) -> i64;

    fn index_value(&self) -> String;
}

/// 以所有者 id 为二级索引的实体，可以按所有者列出
pub trait OwnedEntity: CacheEntity {
    fn owner_id(&self) -> i64;
}
