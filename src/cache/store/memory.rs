use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::CacheStore;
use crate::cache::error::{CacheError, CacheResult};

#[derive(Debug, Clone)]
enum Value {
    Hash(HashMap<String, String>),
    Set(BTreeSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// 进程内缓存存储
///
/// 行为与 Redis 的哈希/集合命令一致：过期在访问时惰性清理，
/// 集合删空后键随之消失。用于测试和本地运行。
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前未过期的键数量
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 剩余存活时间，键不存在或未设置过期时为 None
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        let entry = entries.get(key).filter(|entry| !entry.is_expired(now))?;
        entry.expires_at.map(|at| at.saturating_duration_since(now))
    }
}

fn live<'a>(
    entries: &'a mut HashMap<String, Entry>,
    key: &str,
) -> Option<&'a mut Entry> {
    let now = Instant::now();
    if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

fn wrong_type(key: &str) -> CacheError {
    CacheError::WrongType {
        key: key.to_string(),
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        if live(&mut entries, key).is_none() {
            entries.insert(
                key.to_string(),
                Entry {
                    value: Value::Hash(HashMap::new()),
                    expires_at: None,
                },
            );
        }
        match entries.get_mut(key).map(|entry| &mut entry.value) {
            Some(Value::Hash(hash)) => {
                for (field, value) in fields {
                    hash.insert(field.to_string(), value.clone());
                }
                Ok(())
            }
            _ => Err(wrong_type(key)),
        }
    }

    async fn hgetall(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        let mut entries = self.entries.lock().await;
        match live(&mut entries, key).map(|entry| &entry.value) {
            Some(Value::Hash(hash)) => Ok(hash.clone()),
            Some(Value::Set(_)) => Err(wrong_type(key)),
            None => Ok(HashMap::new()),
        }
    }

    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        match live(&mut entries, key).map(|entry| &entry.value) {
            Some(Value::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(Value::Set(_)) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn sadd(&self, key: &str, member: &str) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        if live(&mut entries, key).is_none() {
            entries.insert(
                key.to_string(),
                Entry {
                    value: Value::Set(BTreeSet::new()),
                    expires_at: None,
                },
            );
        }
        match entries.get_mut(key).map(|entry| &mut entry.value) {
            Some(Value::Set(set)) => {
                set.insert(member.to_string());
                Ok(())
            }
            _ => Err(wrong_type(key)),
        }
    }

    async fn srem(&self, key: &str, member: &str) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        let now_empty = match live(&mut entries, key).map(|entry| &mut entry.value) {
            Some(Value::Set(set)) => {
                set.remove(member);
                set.is_empty()
            }
            Some(Value::Hash(_)) => return Err(wrong_type(key)),
            None => return Ok(()),
        };
        // 与 Redis 一致：空集合不存在
        if now_empty {
            entries.remove(key);
        }
        Ok(())
    }

    async fn scard(&self, key: &str) -> CacheResult<u64> {
        let mut entries = self.entries.lock().await;
        match live(&mut entries, key).map(|entry| &entry.value) {
            Some(Value::Set(set)) => Ok(set.len() as u64),
            Some(Value::Hash(_)) => Err(wrong_type(key)),
            None => Ok(0),
        }
    }

    async fn smembers(&self, key: &str) -> CacheResult<Vec<String>> {
        let mut entries = self.entries.lock().await;
        match live(&mut entries, key).map(|entry| &entry.value) {
            Some(Value::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(Value::Hash(_)) => Err(wrong_type(key)),
            None => Ok(Vec::new()),
        }
    }

    async fn del(&self, keys: &[String]) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut entries = self.entries.lock().await;
        Ok(live(&mut entries, key).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = live(&mut entries, key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn flush(&self) -> CacheResult<()> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_fields_are_merged() {
        let store = MemoryCacheStore::new();
        store
            .hset_multiple("user:1", &[("email", "a@b.c".into())])
            .await
            .unwrap();
        store
            .hset_multiple("user:1", &[("data", "{}".into())])
            .await
            .unwrap();

        let hash = store.hgetall("user:1").await.unwrap();
        assert_eq!(hash.len(), 2);
        assert_eq!(
            store.hget("user:1", "email").await.unwrap().as_deref(),
            Some("a@b.c")
        );
        assert!(store.hgetall("user:2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn removing_last_member_drops_the_set() {
        let store = MemoryCacheStore::new();
        store.sadd("owner_id:7", "1").await.unwrap();
        store.sadd("owner_id:7", "2").await.unwrap();
        store.sadd("owner_id:7", "2").await.unwrap();
        assert_eq!(store.scard("owner_id:7").await.unwrap(), 2);

        store.srem("owner_id:7", "1").await.unwrap();
        assert!(store.exists("owner_id:7").await.unwrap());

        store.srem("owner_id:7", "2").await.unwrap();
        assert!(!store.exists("owner_id:7").await.unwrap());
        assert_eq!(store.scard("owner_id:7").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn expired_keys_vanish() {
        let store = MemoryCacheStore::new();
        store.sadd("email:a@b.c", "1").await.unwrap();
        store
            .expire("email:a@b.c", Duration::from_millis(10))
            .await
            .unwrap();
        assert!(store.ttl("email:a@b.c").await.is_some());

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(!store.exists("email:a@b.c").await.unwrap());
        assert!(store.smembers("email:a@b.c").await.unwrap().is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn type_mismatch_is_an_error() {
        let store = MemoryCacheStore::new();
        store.sadd("owner_id:1", "1").await.unwrap();

        assert!(matches!(
            store.hgetall("owner_id:1").await,
            Err(CacheError::WrongType { .. })
        ));
        assert!(matches!(
            store.hset_multiple("owner_id:1", &[("a", "b".into())]).await,
            Err(CacheError::WrongType { .. })
        ));
    }

    #[tokio::test]
    async fn flush_clears_everything() {
        let store = MemoryCacheStore::new();
        store.sadd("a", "1").await.unwrap();
        store.hset_multiple("b", &[("f", "v".into())]).await.unwrap();
        assert_eq!(store.len().await, 2);

        store.flush().await.unwrap();
        assert!(store.is_empty().await);
    }
}
