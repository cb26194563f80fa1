use async_trait::async_trait;
use sqlx::PgPool;

use crate::cache::consistency::OwnerListing;
use crate::database::FileStore;
use crate::database::models::file::{File, FileUpdate, NewFile, Page};

const FILE_COLUMNS: &str = "id, path, is_folder, owner_id, created_at, updated_at";

/// 文件存储库实现
#[derive(Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerListing<File> for PgFileRepository {
    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.unwrap_or(0))
    }

    async fn list_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<File>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {FILE_COLUMNS}
            FROM files
            WHERE owner_id = $1
            ORDER BY id
            OFFSET $2
            LIMIT $3
            "#
        );
        sqlx::query_as::<_, File>(&sql)
            .bind(owner_id)
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await
    }
}

#[async_trait]
impl FileStore for PgFileRepository {
    async fn create(&self, owner_id: i64, file: NewFile) -> Result<File, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO files (path, is_folder, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING {FILE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, File>(&sql)
            .bind(&file.path)
            .bind(file.is_folder)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_by_id(&self, file_id: i64) -> Result<Option<File>, sqlx::Error> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1");
        sqlx::query_as::<_, File>(&sql)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_by_path(&self, owner_id: i64, path: &str) -> Result<Option<File>, sqlx::Error> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE owner_id = $1 AND path = $2");
        sqlx::query_as::<_, File>(&sql)
            .bind(owner_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await
    }

    async fn paths_like(&self, owner_id: i64, prefix: &str) -> Result<Vec<String>, sqlx::Error> {
        // LIKE 通配符需要转义
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");

        sqlx::query_scalar("SELECT path FROM files WHERE owner_id = $1 AND path LIKE $2")
            .bind(owner_id)
            .bind(format!("{}%", escaped))
            .fetch_all(&self.pool)
            .await
    }

    async fn update(&self, file_id: i64, update: FileUpdate) -> Result<File, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE files
            SET path = COALESCE($1, path),
                is_folder = COALESCE($2, is_folder),
                updated_at = NOW()
            WHERE id = $3
            RETURNING {FILE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, File>(&sql)
            .bind(update.path)
            .bind(update.is_folder)
            .bind(file_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn delete(&self, file_id: i64) -> Result<(), sqlx::Error> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    async fn ids_by_owner(&self, owner_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM files WHERE owner_id = $1 ORDER BY id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
    }
}
