use crate::cache::keys::user_keys::{EMAIL_FIELD, USER_PREFIX};
use crate::database::models::user::User;

use super::CacheEntity;

/// 用户缓存：`user:{id}` 哈希 + `email:{email}` 索引集合
impl CacheEntity for User {
    const ENTITY: &'static str = USER_PREFIX;
    const INDEX_FIELD: &'static str = EMAIL_FIELD;
    const SCHEMA_VERSION: u32 = 1;

    fn entity_id(&self) -> i64 {
        self.id
    }

    fn index_value(&self) -> String {
        self.email.clone()
    }
}
