use std::sync::Arc;

use crate::cache::UserCache;
use crate::database::{NewUser, User, UserStore, UserUpdate};
use crate::error::{AppError, AppResult};

use super::{not_found, store_error, unique_conflict};
use crate::utils::{hash_password, verify_password};

/// 用户的读写编排：数据库为准，缓存旁路
#[derive(Clone)]
pub struct UserOperations {
    store: Arc<dyn UserStore>,
    cache: UserCache,
}

impl UserOperations {
    pub fn new(store: Arc<dyn UserStore>, cache: UserCache) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &UserCache {
        &self.cache
    }

    pub async fn create(&self, email: &str, password: &str) -> AppResult<User> {
        let hashed_password = hash_password(password)?;
        let user = self
            .store
            .create(NewUser {
                email: email.to_string(),
                hashed_password,
            })
            .await
            .map_err(|e| unique_conflict(e, "A user with this email already exists"))?;

        self.write_cache(&user).await;
        Ok(user)
    }

    pub async fn read(&self, user_id: i64) -> AppResult<Option<User>> {
        match self.cache.read_by_id(user_id).await {
            Ok(Some(user)) => return Ok(Some(user)),
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read for user {} failed: {}", user_id, e),
        }

        let user = self.store.get_by_id(user_id).await?;
        if let Some(user) = &user {
            self.write_cache(user).await;
        }
        Ok(user)
    }

    pub async fn read_by_email(&self, email: &str) -> AppResult<Option<User>> {
        match self.cache.read_by_email(email).await {
            Ok(Some(user)) => return Ok(Some(user)),
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read for email {} failed: {}", email, e),
        }

        let user = self.store.get_by_email(email).await?;
        if let Some(user) = &user {
            self.write_cache(user).await;
        }
        Ok(user)
    }

    /// 更新用户资料
    ///
    /// 邮箱改变时先删除旧的缓存登记再写入新的，旧邮箱不会再命中。
    pub async fn update(&self, user_id: i64, update: UserUpdate) -> AppResult<User> {
        let current = self
            .read(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        if let Some(email) = update.email.as_deref() {
            if email != current.email {
                if let Some(other) = self.read_by_email(email).await? {
                    if other.id != user_id {
                        return Err(AppError::Conflict(
                            "User with this email already exists".into(),
                        ));
                    }
                }
            }
        }

        let updated = self
            .store
            .update(user_id, update)
            .await
            .map_err(|e| {
                store_error(e, "User not found", "User with this email already exists")
            })?;

        if updated.email != current.email {
            tracing::debug!(
                "Email of user {} changed, replacing cache entry",
                user_id
            );
            self.delete_cache(user_id).await;
        }
        self.write_cache(&updated).await;
        Ok(updated)
    }

    /// 修改密码，索引不变，直接覆盖缓存快照
    pub async fn update_password(&self, user_id: i64, new_password: &str) -> AppResult<User> {
        let hashed_password = hash_password(new_password)?;
        let updated = self
            .store
            .update_password(user_id, &hashed_password)
            .await
            .map_err(|e| not_found(e, "User not found"))?;

        self.write_cache(&updated).await;
        Ok(updated)
    }

    /// 邮箱和密码都正确时返回用户
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<User>> {
        let Some(user) = self.read_by_email(email).await? else {
            return Ok(None);
        };
        if verify_password(password, &user.hashed_password)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// 只删除用户本身，名下文件由级联删除负责
    pub async fn delete(&self, user_id: i64) -> AppResult<()> {
        self.store
            .delete(user_id)
            .await
            .map_err(|e| not_found(e, "User not found"))?;
        self.delete_cache(user_id).await;
        Ok(())
    }

    async fn write_cache(&self, user: &User) {
        if let Err(e) = self.cache.write(user).await {
            tracing::warn!("Failed to cache user {}: {}", user.id, e);
        }
    }

    async fn delete_cache(&self, user_id: i64) {
        if let Err(e) = self.cache.delete_by_id(user_id).await {
            tracing::warn!("Failed to evict user {} from cache: {}", user_id, e);
        }
    }
}
