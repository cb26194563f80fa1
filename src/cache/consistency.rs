//! 按所有者列出实体时的缓存一致性检查
//!
//! 先比较数据库计数和缓存索引集合的基数：相等时信任缓存，
//! 否则绕过缓存读数据库，并把读到的实体回写缓存。
//! 计数相等并不能证明成员完全一致（并发的插入+删除可能恰好抵消），
//! 这里接受这种近似，换取命中时的速度。

use async_trait::async_trait;

use crate::cache::models::OwnedEntity;
use crate::cache::operations::EntityCache;
use crate::database::models::file::Page;

/// 权威数据源上按所有者计数和分页读取
#[async_trait]
pub trait OwnerListing<E>: Send + Sync {
    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, sqlx::Error>;

    /// 按 id 升序分页
    async fn list_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<E>, sqlx::Error>;
}

/// 列表结果来自哪里
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Cache,
    Store,
}

#[derive(Debug, Clone)]
pub struct Listing<E> {
    pub items: Vec<E>,
    /// 数据库中的总数
    pub total: i64,
    pub source: ListingSource,
}

/// 一致性协调器
pub struct ConsistencyCoordinator<E> {
    cache: EntityCache<E>,
}

impl<E> Clone for ConsistencyCoordinator<E> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<E: OwnedEntity> ConsistencyCoordinator<E> {
    pub fn new(cache: EntityCache<E>) -> Self {
        Self { cache }
    }

    pub async fn list_by_owner<S>(
        &self,
        source: &S,
        owner_id: i64,
        page: Page,
    ) -> Result<Listing<E>, sqlx::Error>
    where
        S: OwnerListing<E> + ?Sized,
    {
        let total = source.count_by_owner(owner_id).await?;

        if let Some(items) = self.try_cached(owner_id, total).await {
            tracing::debug!("Serving {} listing for owner {} from cache", E::ENTITY, owner_id);
            return Ok(Listing {
                items: page.apply(items),
                total,
                source: ListingSource::Cache,
            });
        }

        tracing::debug!(
            "Cache listing for owner {} is not trusted, reading from store",
            owner_id
        );
        let items = source.list_by_owner(owner_id, page).await?;

        // 回写修复，下次更可能命中
        for item in &items {
            if let Err(e) = self.cache.write(item).await {
                tracing::warn!(
                    "Failed to repopulate {} {} in cache: {}",
                    E::ENTITY,
                    item.entity_id(),
                    e
                );
            }
        }

        Ok(Listing {
            items,
            total,
            source: ListingSource::Store,
        })
    }

    /// 计数一致且每个成员都能读到时返回缓存中的完整列表
    async fn try_cached(&self, owner_id: i64, total: i64) -> Option<Vec<E>> {
        if total <= 0 {
            return None;
        }

        let index = owner_id.to_string();
        let cached = match self.cache.count_by_index(&index).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Cache count for owner {} unavailable: {}", owner_id, e);
                return None;
            }
        };
        if cached != total as u64 {
            tracing::debug!(
                "Owner {} count mismatch: store {}, cache {}",
                owner_id,
                total,
                cached
            );
            return None;
        }

        match self.cache.read_all_by_index(&index).await {
            Ok(items)
                if items.len() as i64 == total
                    && items.iter().all(|item| item.owner_id() == owner_id) =>
            {
                Some(items)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Cache listing for owner {} unavailable: {}", owner_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::cache::operations::FileCache;
    use crate::cache::store::{CacheStore, MemoryCacheStore, RedisCacheStore};
    use crate::database::File;

    /// 只读的权威数据源，记录分页查询次数
    struct Source {
        files: Vec<File>,
        list_calls: AtomicUsize,
    }

    impl Source {
        fn new(files: Vec<File>) -> Self {
            Self {
                files,
                list_calls: AtomicUsize::new(0),
            }
        }

        fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OwnerListing<File> for Source {
        async fn count_by_owner(&self, owner_id: i64) -> Result<i64, sqlx::Error> {
            Ok(self.files.iter().filter(|f| f.owner_id == owner_id).count() as i64)
        }

        async fn list_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<File>, sqlx::Error> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let mut owned: Vec<File> = self
                .files
                .iter()
                .filter(|f| f.owner_id == owner_id)
                .cloned()
                .collect();
            owned.sort_by_key(|f| f.id);
            Ok(page.apply(owned))
        }
    }

    fn file(id: i64, owner_id: i64) -> File {
        File {
            id,
            path: format!("/f{}", id),
            is_folder: false,
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn setup() -> (Arc<MemoryCacheStore>, FileCache, ConsistencyCoordinator<File>) {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = FileCache::new(store.clone(), Duration::from_secs(3600));
        let coordinator = ConsistencyCoordinator::new(cache.clone());
        (store, cache, coordinator)
    }

    #[tokio::test]
    async fn equal_counts_are_served_from_cache() {
        let (_, cache, coordinator) = setup();
        let files = vec![file(1, 7), file(2, 7)];
        for f in &files {
            cache.write(f).await.unwrap();
        }
        let source = Source::new(files.clone());

        let listing = coordinator
            .list_by_owner(&source, 7, Page::default())
            .await
            .unwrap();

        assert_eq!(listing.source, ListingSource::Cache);
        assert_eq!(listing.total, 2);
        assert_eq!(listing.items, files);
        assert_eq!(source.list_calls(), 0);
    }

    #[tokio::test]
    async fn short_cache_falls_back_and_repairs() {
        let (_, cache, coordinator) = setup();
        let files = vec![file(1, 3), file(2, 3), file(3, 3)];
        cache.write(&files[0]).await.unwrap();
        cache.write(&files[1]).await.unwrap();
        assert_eq!(cache.count_files_by_owner(3).await.unwrap(), 2);
        let source = Source::new(files.clone());

        let listing = coordinator
            .list_by_owner(&source, 3, Page::default())
            .await
            .unwrap();

        assert_eq!(listing.source, ListingSource::Store);
        assert_eq!(listing.items.len(), 3);
        assert_eq!(cache.count_files_by_owner(3).await.unwrap(), 3);

        // 修复后的下一次读取命中缓存
        let again = coordinator
            .list_by_owner(&source, 3, Page::default())
            .await
            .unwrap();
        assert_eq!(again.source, ListingSource::Cache);
        assert_eq!(source.list_calls(), 1);
    }

    #[tokio::test]
    async fn long_cache_is_not_trusted() {
        let (_, cache, coordinator) = setup();
        // 缓存里多出一个数据库已经没有的文件
        cache.write(&file(1, 4)).await.unwrap();
        cache.write(&file(2, 4)).await.unwrap();
        let source = Source::new(vec![file(1, 4)]);

        let listing = coordinator
            .list_by_owner(&source, 4, Page::default())
            .await
            .unwrap();

        assert_eq!(listing.source, ListingSource::Store);
        assert_eq!(listing.items.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn equal_counts_with_missing_entry_fall_back() {
        let (store, cache, coordinator) = setup();
        let files = vec![file(1, 5), file(2, 5)];
        for f in &files {
            cache.write(f).await.unwrap();
        }
        // 集合基数仍为 2，但其中一个哈希已丢失
        store.del(&[FileCache::entity_key(2)]).await.unwrap();
        let source = Source::new(files);

        let listing = coordinator
            .list_by_owner(&source, 5, Page::default())
            .await
            .unwrap();

        assert_eq!(listing.source, ListingSource::Store);
        assert_eq!(listing.items.len(), 2);
        assert!(cache.exists(2).await.unwrap());
    }

    #[tokio::test]
    async fn empty_owner_reads_the_store() {
        let (_, _, coordinator) = setup();
        let source = Source::new(Vec::new());

        let listing = coordinator
            .list_by_owner(&source, 8, Page::default())
            .await
            .unwrap();

        assert_eq!(listing.source, ListingSource::Store);
        assert!(listing.items.is_empty());
        assert_eq!(listing.total, 0);
    }

    #[tokio::test]
    async fn cached_listing_honours_the_page() {
        let (_, cache, coordinator) = setup();
        let files: Vec<File> = (1..=5).map(|id| file(id, 6)).collect();
        for f in &files {
            cache.write(f).await.unwrap();
        }
        let source = Source::new(files);

        let listing = coordinator
            .list_by_owner(&source, 6, Page::new(1, 2))
            .await
            .unwrap();

        assert_eq!(listing.source, ListingSource::Cache);
        assert_eq!(listing.total, 5);
        assert_eq!(listing.items.iter().map(|f| f.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[tokio::test]
    async fn unavailable_cache_degrades_to_store() {
        let redis: Arc<dyn CacheStore> =
            Arc::new(RedisCacheStore::open("redis://127.0.0.1:6379/0").unwrap());
        let coordinator =
            ConsistencyCoordinator::new(FileCache::new(redis, Duration::from_secs(60)));
        let source = Source::new(vec![file(1, 2), file(2, 2)]);

        let listing = coordinator
            .list_by_owner(&source, 2, Page::default())
            .await
            .unwrap();

        assert_eq!(listing.source, ListingSource::Store);
        assert_eq!(listing.items.len(), 2);
    }
}
