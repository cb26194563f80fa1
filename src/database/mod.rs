// 数据库模块
// 权威数据源：实体定义、存储接口和 PostgreSQL 实现

pub mod models; // 数据库实体定义
pub mod repositories; // PostgreSQL 存储实现

use async_trait::async_trait;

use crate::cache::consistency::OwnerListing;

// 重新导出常用类型，方便其他模块使用
pub use models::file::{File, FileUpdate, NewFile, Page};
pub use models::user::{NewUser, User, UserUpdate};
pub use repositories::file::PgFileRepository;
pub use repositories::user::PgUserRepository;

/// 用户存储接口
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, sqlx::Error>;

    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, sqlx::Error>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;

    /// 更新用户，记录不存在时返回 `RowNotFound`
    async fn update(&self, user_id: i64, update: UserUpdate) -> Result<User, sqlx::Error>;

    async fn update_password(
        &self,
        user_id: i64,
        hashed_password: &str,
    ) -> Result<User, sqlx::Error>;

    async fn delete(&self, user_id: i64) -> Result<(), sqlx::Error>;
}

/// 文件存储接口
///
/// 按所有者计数和分页列出由 [`OwnerListing`] 提供，供一致性检查使用。
#[async_trait]
pub trait FileStore: OwnerListing<File> {
    async fn create(&self, owner_id: i64, file: NewFile) -> Result<File, sqlx::Error>;

    async fn get_by_id(&self, file_id: i64) -> Result<Option<File>, sqlx::Error>;

    async fn get_by_path(&self, owner_id: i64, path: &str) -> Result<Option<File>, sqlx::Error>;

    /// 所有者名下以 `prefix` 开头的全部路径
    async fn paths_like(&self, owner_id: i64, prefix: &str) -> Result<Vec<String>, sqlx::Error>;

    /// 更新文件，记录不存在时返回 `RowNotFound`
    async fn update(&self, file_id: i64, update: FileUpdate) -> Result<File, sqlx::Error>;

    async fn delete(&self, file_id: i64) -> Result<(), sqlx::Error>;

    async fn ids_by_owner(&self, owner_id: i64) -> Result<Vec<i64>, sqlx::Error>;
}
