//! 删除用户时的级联策略
//!
//! 顺序固定：先逐个删除用户名下的文件（数据库，再缓存），最后删除用户本身。
//! 实体缓存无法校验这一顺序，由这里保证。

use serde::Serialize;

use super::{FileOperations, UserOperations};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub user_id: i64,
    pub files_deleted: usize,
}

pub struct CascadeDelete<'a> {
    users: &'a UserOperations,
    files: &'a FileOperations,
}

impl<'a> CascadeDelete<'a> {
    pub fn new(users: &'a UserOperations, files: &'a FileOperations) -> Self {
        Self { users, files }
    }

    pub async fn delete_user(&self, user_id: i64) -> AppResult<CascadeReport> {
        let file_ids = self.files.ids_by_owner(user_id).await?;

        let mut files_deleted = 0;
        for file_id in file_ids {
            match self.files.delete(file_id).await {
                Ok(()) => files_deleted += 1,
                // 并发删除，已经不在了
                Err(AppError::NotFound(_)) => {
                    tracing::debug!("File {} vanished during cascade", file_id);
                }
                Err(e) => return Err(e),
            }
        }

        self.users.delete(user_id).await?;

        tracing::info!(
            "Deleted user {} together with {} files",
            user_id,
            files_deleted
        );
        Ok(CascadeReport {
            user_id,
            files_deleted,
        })
    }
}
