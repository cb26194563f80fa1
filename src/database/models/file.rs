use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 文件数据库实体，以层级路径标识
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    pub id: i64,
    pub path: String,
    pub is_folder: bool,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建文件请求
#[derive(Debug, Clone, Deserialize)]
pub struct NewFile {
    pub path: String,
    #[serde(default)]
    pub is_folder: bool,
}

/// 文件可更新字段，None 表示不修改
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileUpdate {
    pub path: Option<String>,
    pub is_folder: Option<bool>,
}

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    25
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

impl Page {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: skip.max(0),
            limit: limit.max(0),
        }
    }

    /// 对已经按 id 排好序的完整列表取当前页
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip.max(0) as usize)
            .take(self.limit.max(0) as usize)
            .collect()
    }
}
