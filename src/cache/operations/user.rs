use crate::cache::error::{CacheError, CacheResult};
use crate::database::models::user::User;

use super::entity::EntityCache;

/// 用户缓存操作
pub type UserCache = EntityCache<User>;

impl EntityCache<User> {
    /// 通过邮箱索引读取用户
    ///
    /// 邮箱唯一，索引集合最多一个成员；出现多个成员说明上游破坏了
    /// 唯一性约束，返回 `IndexViolation` 而不是任取一个。
    /// 快照里的邮箱与查询不一致（旧索引没删掉）时按未命中处理，并移除这条旧索引。
    pub async fn read_by_email(&self, email: &str) -> CacheResult<Option<User>> {
        let ids = self.read_ids_by_index(email).await?;

        match ids.as_slice() {
            [] => Ok(None),
            [user_id] => match self.read_by_id(*user_id).await? {
                Some(user) if user.email == email => Ok(Some(user)),
                Some(user) => {
                    tracing::warn!(
                        "Stale email index {} points at user {} now using {}",
                        Self::index_key(email),
                        user.id,
                        user.email
                    );
                    self.remove_index_member(email, user.id).await?;
                    Ok(None)
                }
                None => {
                    self.remove_index_member(email, *user_id).await?;
                    Ok(None)
                }
            },
            _ => Err(CacheError::IndexViolation {
                key: Self::index_key(email),
                members: ids.len(),
            }),
        }
    }
}
