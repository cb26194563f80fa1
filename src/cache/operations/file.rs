use crate::cache::error::CacheResult;
use crate::database::models::file::File;

use super::entity::EntityCache;

/// 文件缓存操作
pub type FileCache = EntityCache<File>;

impl EntityCache<File> {
    /// 所有者名下已缓存的全部文件，按 id 升序
    pub async fn read_files_by_owner(&self, owner_id: i64) -> CacheResult<Vec<File>> {
        self.read_all_by_index(&owner_id.to_string()).await
    }

    /// 所有者索引集合的基数
    pub async fn count_files_by_owner(&self, owner_id: i64) -> CacheResult<u64> {
        self.count_by_index(&owner_id.to_string()).await
    }
}
