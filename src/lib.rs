use std::sync::Arc;

use cache::{CacheStore, FileCache, UserCache};
use config::Config;
use database::{FileStore, UserStore};
use operations::{CascadeDelete, FileOperations, UserOperations};

pub mod cache;
pub mod common;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod operations;
pub mod router;
pub mod routes;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: UserOperations,
    pub files: FileOperations,
}

impl AppState {
    pub fn new(
        config: Config,
        user_store: Arc<dyn UserStore>,
        file_store: Arc<dyn FileStore>,
        cache_store: Arc<dyn CacheStore>,
    ) -> Self {
        let ttl = config.cache_ttl();
        let users = UserOperations::new(user_store, UserCache::new(cache_store.clone(), ttl));
        let files = FileOperations::new(file_store, FileCache::new(cache_store, ttl));
        Self {
            config,
            users,
            files,
        }
    }

    pub fn cascade(&self) -> CascadeDelete<'_> {
        CascadeDelete::new(&self.users, &self.files)
    }
}
