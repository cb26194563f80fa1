use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::cache::error::CacheResult;
use crate::cache::keys::{entity_key, index_key};
use crate::cache::models::{CacheEntity, decode_snapshot, encode_snapshot};
use crate::cache::store::CacheStore;

/// 快照所在的哈希字段
pub const DATA_FIELD: &str = "data";

/// 单一实体类型的缓存操作
///
/// 写入：`{ENTITY}:{id}` 哈希保存索引值和快照，同时把 id 加入
/// `{INDEX_FIELD}:{index}` 集合，两个键设置相同的过期时间。
/// 多个命令之间不是原子的，中途失败可能只写入一半，由 TTL 和
/// 读路径上的修复兜底。
pub struct EntityCache<E> {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityCache<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ttl: self.ttl,
            _entity: PhantomData,
        }
    }
}

impl<E: CacheEntity> EntityCache<E> {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            _entity: PhantomData,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn entity_key(id: i64) -> String {
        entity_key(E::ENTITY, id)
    }

    pub fn index_key(index: &str) -> String {
        index_key(E::INDEX_FIELD, index)
    }

    /// 写入（或覆盖）实体快照并登记二级索引
    pub async fn write(&self, entity: &E) -> CacheResult<()> {
        let id = entity.entity_id();
        let index = entity.index_value();
        let data = encode_snapshot(entity)?;

        let key = Self::entity_key(id);
        let set_key = Self::index_key(&index);

        self.store
            .hset_multiple(&key, &[(E::INDEX_FIELD, index), (DATA_FIELD, data)])
            .await?;
        self.store.sadd(&set_key, &id.to_string()).await?;
        self.store.expire(&key, self.ttl).await?;
        self.store.expire(&set_key, self.ttl).await?;

        tracing::debug!("Set {} to cache: {}", E::ENTITY, key);
        Ok(())
    }

    /// 按 id 读取快照，`Ok(None)` 表示未命中
    ///
    /// 无法解码的快照会被删除，并把解码错误返回给调用方。
    pub async fn read_by_id(&self, id: i64) -> CacheResult<Option<E>> {
        let key = Self::entity_key(id);
        let hash = self.store.hgetall(&key).await?;

        let Some(raw) = hash.get(DATA_FIELD) else {
            tracing::debug!("Cache miss: {}", key);
            return Ok(None);
        };

        match decode_snapshot::<E>(raw) {
            Ok(entity) => {
                tracing::debug!("Get {} from cache: {}", E::ENTITY, key);
                Ok(Some(entity))
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry {}: {}", key, e);
                if let Err(del_err) = self.delete_by_id(id).await {
                    tracing::warn!("Failed to discard cache entry {}: {}", key, del_err);
                }
                Err(e)
            }
        }
    }

    /// 索引集合中的全部 id，按升序
    pub async fn read_ids_by_index(&self, index: &str) -> CacheResult<Vec<i64>> {
        let set_key = Self::index_key(index);
        let members = self.store.smembers(&set_key).await?;

        let mut ids: Vec<i64> = members
            .iter()
            .filter_map(|member| match member.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!("Ignoring non-numeric member {:?} in {}", member, set_key);
                    None
                }
            })
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// 读取索引集合里所有仍然存在的实体，按 id 升序
    ///
    /// 哈希已经消失（过期或损坏）的成员会从集合中移除。
    pub async fn read_all_by_index(&self, index: &str) -> CacheResult<Vec<E>> {
        let ids = self.read_ids_by_index(index).await?;
        let reads = join_all(ids.iter().map(|id| self.read_by_id(*id))).await;

        let set_key = Self::index_key(index);
        let mut entities = Vec::with_capacity(ids.len());
        for (id, read) in ids.iter().zip(reads) {
            match read {
                Ok(Some(entity)) => entities.push(entity),
                Ok(None) => {
                    tracing::debug!("Removing dangling member {} from {}", id, set_key);
                    self.store.srem(&set_key, &id.to_string()).await?;
                }
                // 损坏的条目已在 read_by_id 中清理
                Err(e) if e.is_corrupt_entry() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(entities)
    }

    pub async fn count_by_index(&self, index: &str) -> CacheResult<u64> {
        self.store.scard(&Self::index_key(index)).await
    }

    /// 删除实体缓存及其索引登记
    ///
    /// 从哈希里读出索引值以定位集合；实体从未缓存时什么也不做，返回 false。
    /// 集合被删空时连同集合键一起删除。
    pub async fn delete_by_id(&self, id: i64) -> CacheResult<bool> {
        let key = Self::entity_key(id);

        let Some(index) = self.store.hget(&key, E::INDEX_FIELD).await? else {
            return Ok(false);
        };

        self.remove_index_member(&index, id).await?;
        self.store.del(&[key]).await?;

        tracing::debug!("Removed {} {} from cache", E::ENTITY, id);
        Ok(true)
    }

    /// 从索引集合中移除一个 id，集合删空时连同集合键一起删除
    pub async fn remove_index_member(&self, index: &str, id: i64) -> CacheResult<()> {
        let set_key = Self::index_key(index);
        self.store.srem(&set_key, &id.to_string()).await?;
        if self.store.scard(&set_key).await? == 0 {
            self.store.del(&[set_key]).await?;
        }
        Ok(())
    }

    pub async fn exists(&self, id: i64) -> CacheResult<bool> {
        self.store.exists(&Self::entity_key(id)).await
    }

    pub async fn index_exists(&self, index: &str) -> CacheResult<bool> {
        self.store.exists(&Self::index_key(index)).await
    }

    /// 索引集合中是否包含该 id
    pub async fn index_contains(&self, index: &str, id: i64) -> CacheResult<bool> {
        Ok(self.read_ids_by_index(index).await?.contains(&id))
    }
}
