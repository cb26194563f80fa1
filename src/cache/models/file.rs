use crate::cache::keys::file_keys::{FILE_PREFIX, OWNER_FIELD};
use crate::database::models::file::File;

use super::{CacheEntity, OwnedEntity};

/// 文件缓存：`file:{id}` 哈希 + `owner_id:{owner}` 索引集合
///
/// 版本 1 的文件以 name + access_key 标识，版本 2 改为层级路径，
/// 旧版本快照会在解码时被识别并丢弃。
impl CacheEntity for File {
    const ENTITY: &'static str = FILE_PREFIX;
    const INDEX_FIELD: &'static str = OWNER_FIELD;
    const SCHEMA_VERSION: u32 = 2;

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn index_value(&self) -> String {
        self.owner_id.to_string()
    }
}

impl OwnedEntity for File {
    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}
