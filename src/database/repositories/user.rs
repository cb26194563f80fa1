use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::UserStore;
use crate::database::models::user::{NewUser, User, UserUpdate};

const USER_COLUMNS: &str = "id, email, hashed_password, created_at, updated_at";

/// 用户存储库实现
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    /// 创建用户
    async fn create(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO users (email, hashed_password, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.hashed_password)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(user) => {
                tracing::info!("Created user: {}", user.id);
                Ok(user)
            }
            Err(e) => {
                tracing::error!("Failed to create user: {:?}", e);
                Err(e)
            }
        }
    }

    /// 根据ID查找用户
    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// 根据邮箱查找用户
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update(&self, user_id: i64, update: UserUpdate) -> Result<User, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE users
            SET email = COALESCE($1, email), updated_at = NOW()
            WHERE id = $2
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(update.email)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    /// 更新用户密码
    async fn update_password(
        &self,
        user_id: i64,
        hashed_password: &str,
    ) -> Result<User, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE users
            SET hashed_password = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(hashed_password)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn delete(&self, user_id: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }
}
