//! 测试用的内存存储和应用状态

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::error::{DatabaseError, ErrorKind};

use crate::AppState;
use crate::cache::consistency::OwnerListing;
use crate::cache::store::{CacheStore, MemoryCacheStore};
use crate::config::Config;
use crate::database::{File, FileStore, FileUpdate, NewFile, NewUser, Page, User, UserStore, UserUpdate};

pub fn test_config() -> Config {
    Config::from_lookup(|key: &str| match key {
        "DATABASE_URL" => Some("postgres://localhost/fileshare_test".into()),
        "REDIS_SERVER" => Some("localhost".into()),
        "SECRET_KEY" => Some("test-secret-key".into()),
        _ => None,
    })
    .unwrap()
}

/// 与 PostgreSQL 唯一约束冲突（23505）相同形态的错误
#[derive(Debug)]
pub struct UniqueViolation {
    constraint: &'static str,
}

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate key value violates unique constraint \"{}\"",
            self.constraint
        )
    }
}

impl StdError for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23505"))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

pub fn unique_violation(constraint: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(UniqueViolation { constraint }))
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<BTreeMap<i64, User>>,
    next_id: AtomicI64,
}

impl InMemoryUserStore {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(unique_violation("users_email_key"));
        }
        let now = Utc::now();
        let created = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            email: user.email,
            hashed_password: user.hashed_password,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, user_id: i64, update: UserUpdate) -> Result<User, sqlx::Error> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = update.email.as_deref() {
            if users.values().any(|u| u.email == email && u.id != user_id) {
                return Err(unique_violation("users_email_key"));
            }
        }
        let user = users.get_mut(&user_id).ok_or(sqlx::Error::RowNotFound)?;
        if let Some(email) = update.email {
            user.email = email;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(
        &self,
        user_id: i64,
        hashed_password: &str,
    ) -> Result<User, sqlx::Error> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or(sqlx::Error::RowNotFound)?;
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, user_id: i64) -> Result<(), sqlx::Error> {
        self.users
            .lock()
            .unwrap()
            .remove(&user_id)
            .map(|_| ())
            .ok_or(sqlx::Error::RowNotFound)
    }
}

#[derive(Default)]
pub struct InMemoryFileStore {
    files: Mutex<BTreeMap<i64, File>>,
    next_id: AtomicI64,
}

impl InMemoryFileStore {
    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl OwnerListing<File> for InMemoryFileStore {
    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, sqlx::Error> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.owner_id == owner_id)
            .count() as i64)
    }

    async fn list_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<File>, sqlx::Error> {
        // BTreeMap 按 id 升序
        let owned = self
            .files
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(page.apply(owned))
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn create(&self, owner_id: i64, file: NewFile) -> Result<File, sqlx::Error> {
        let mut files = self.files.lock().unwrap();
        if files
            .values()
            .any(|f| f.owner_id == owner_id && f.path == file.path)
        {
            return Err(unique_violation("files_owner_id_path_key"));
        }
        let now = Utc::now();
        let created = File {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            path: file.path,
            is_folder: file.is_folder,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        files.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, file_id: i64) -> Result<Option<File>, sqlx::Error> {
        Ok(self.files.lock().unwrap().get(&file_id).cloned())
    }

    async fn get_by_path(&self, owner_id: i64, path: &str) -> Result<Option<File>, sqlx::Error> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .values()
            .find(|f| f.owner_id == owner_id && f.path == path)
            .cloned())
    }

    async fn paths_like(&self, owner_id: i64, prefix: &str) -> Result<Vec<String>, sqlx::Error> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.owner_id == owner_id && f.path.starts_with(prefix))
            .map(|f| f.path.clone())
            .collect())
    }

    async fn update(&self, file_id: i64, update: FileUpdate) -> Result<File, sqlx::Error> {
        let mut files = self.files.lock().unwrap();
        let owner_id = files
            .get(&file_id)
            .ok_or(sqlx::Error::RowNotFound)?
            .owner_id;
        if let Some(path) = update.path.as_deref() {
            if files
                .values()
                .any(|f| f.owner_id == owner_id && f.path == path && f.id != file_id)
            {
                return Err(unique_violation("files_owner_id_path_key"));
            }
        }
        let file = files.get_mut(&file_id).ok_or(sqlx::Error::RowNotFound)?;
        if let Some(path) = update.path {
            file.path = path;
        }
        if let Some(is_folder) = update.is_folder {
            file.is_folder = is_folder;
        }
        file.updated_at = Utc::now();
        Ok(file.clone())
    }

    async fn delete(&self, file_id: i64) -> Result<(), sqlx::Error> {
        self.files
            .lock()
            .unwrap()
            .remove(&file_id)
            .map(|_| ())
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn ids_by_owner(&self, owner_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.owner_id == owner_id)
            .map(|f| f.id)
            .collect())
    }
}

/// 内存存储上的完整应用状态，缓存默认也在内存中
pub struct TestContext<C = MemoryCacheStore> {
    pub state: AppState,
    pub cache: Arc<C>,
    pub users: Arc<InMemoryUserStore>,
    pub files: Arc<InMemoryFileStore>,
}

impl TestContext<MemoryCacheStore> {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, Arc::new(MemoryCacheStore::new()))
    }
}

impl<C: CacheStore + 'static> TestContext<C> {
    /// 使用指定的缓存存储，例如未连接的 Redis
    pub fn with_cache(cache: Arc<C>) -> Self {
        Self::build(test_config(), cache)
    }

    fn build(config: Config, cache: Arc<C>) -> Self {
        let users = Arc::new(InMemoryUserStore::default());
        let files = Arc::new(InMemoryFileStore::default());
        let state = AppState::new(config, users.clone(), files.clone(), cache.clone());
        Self {
            state,
            cache,
            users,
            files,
        }
    }
}
