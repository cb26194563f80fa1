use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::{ConsistencyCoordinator, FileCache, Listing};
use crate::database::{File, FileStore, FileUpdate, NewFile, Page};
use crate::error::{AppError, AppResult};

use super::{not_found, store_error, unique_conflict};

/// 文件的读写编排，按所有者列出时经过一致性检查
#[derive(Clone)]
pub struct FileOperations {
    store: Arc<dyn FileStore>,
    cache: FileCache,
    coordinator: ConsistencyCoordinator<File>,
}

impl FileOperations {
    pub fn new(store: Arc<dyn FileStore>, cache: FileCache) -> Self {
        let coordinator = ConsistencyCoordinator::new(cache.clone());
        Self {
            store,
            cache,
            coordinator,
        }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// 新建文件，同一所有者下路径重复时自动改名
    pub async fn create(&self, owner_id: i64, mut file: NewFile) -> AppResult<File> {
        file.path = self.unique_path(owner_id, &file.path).await?;
        let created = self
            .store
            .create(owner_id, file)
            .await
            .map_err(|e| unique_conflict(e, "Path already exists"))?;

        self.write_cache(&created).await;
        Ok(created)
    }

    pub async fn read(&self, file_id: i64) -> AppResult<Option<File>> {
        match self.cache.read_by_id(file_id).await {
            Ok(Some(file)) => return Ok(Some(file)),
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read for file {} failed: {}", file_id, e),
        }

        let file = self.store.get_by_id(file_id).await?;
        if let Some(file) = &file {
            self.write_cache(file).await;
        }
        Ok(file)
    }

    pub async fn count_by_owner(&self, owner_id: i64) -> AppResult<i64> {
        Ok(self.store.count_by_owner(owner_id).await?)
    }

    pub async fn list_by_owner(&self, owner_id: i64, page: Page) -> AppResult<Listing<File>> {
        Ok(self
            .coordinator
            .list_by_owner(self.store.as_ref(), owner_id, page)
            .await?)
    }

    pub async fn ids_by_owner(&self, owner_id: i64) -> AppResult<Vec<i64>> {
        Ok(self.store.ids_by_owner(owner_id).await?)
    }

    /// 更新文件，所有者不变，缓存索引随之不变
    pub async fn update(&self, file_id: i64, update: FileUpdate) -> AppResult<File> {
        if let Some(path) = update.path.as_deref() {
            let current = self
                .read(file_id)
                .await?
                .ok_or_else(|| AppError::NotFound("File not found".into()))?;
            if path != current.path {
                if let Some(other) = self.store.get_by_path(current.owner_id, path).await? {
                    if other.id != file_id {
                        return Err(AppError::Conflict(format!("Path {} already exists", path)));
                    }
                }
            }
        }

        let updated = self
            .store
            .update(file_id, update)
            .await
            .map_err(|e| store_error(e, "File not found", "Path already exists"))?;

        self.write_cache(&updated).await;
        Ok(updated)
    }

    pub async fn delete(&self, file_id: i64) -> AppResult<()> {
        self.store
            .delete(file_id)
            .await
            .map_err(|e| not_found(e, "File not found"))?;

        if let Err(e) = self.cache.delete_by_id(file_id).await {
            tracing::warn!("Failed to evict file {} from cache: {}", file_id, e);
        }
        Ok(())
    }

    async fn unique_path(&self, owner_id: i64, path: &str) -> AppResult<String> {
        let (stem, _) = split_extension(path);
        let existing: HashSet<String> = self
            .store
            .paths_like(owner_id, stem)
            .await?
            .into_iter()
            .collect();

        let unique = next_free_path(path, &existing);
        if unique != path {
            tracing::debug!("Path {} taken for owner {}, using {}", path, owner_id, unique);
        }
        Ok(unique)
    }

    async fn write_cache(&self, file: &File) {
        if let Err(e) = self.cache.write(file).await {
            tracing::warn!("Failed to cache file {}: {}", file.id, e);
        }
    }
}

/// 拆出最后一段路径的扩展名：`a/b.tar.gz` -> (`a/b.tar`, `gz`)
///
/// 以点开头的文件名（如 `.env`）视为没有扩展名。
fn split_extension(path: &str) -> (&str, Option<&str>) {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = name_start + dot;
            (&path[..dot], Some(&path[dot + 1..]))
        }
        _ => (path, None),
    }
}

/// `path` 未被占用时原样返回，否则依次尝试 `stem_1.ext`、`stem_2.ext` ……
fn next_free_path(path: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(path) {
        return path.to_string();
    }

    let (stem, extension) = split_extension(path);
    (1..)
        .map(|i| match extension {
            Some(ext) => format!("{}_{}.{}", stem, i, ext),
            None => format!("{}_{}", stem, i),
        })
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_else(|| path.to_string())
}
