use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client as RedisClient, IntoConnectionInfo};
use tokio::sync::RwLock;

use super::CacheStore;
use crate::cache::error::{CacheError, CacheResult};
use crate::config::Config;

/// 基于 Redis 的缓存存储
///
/// 进程启动时 `connect` 建立一条共享的多路复用连接，关闭时 `disconnect`。
/// 没有连接时所有命令返回 `CacheError::Unavailable`，上层按未命中处理。
pub struct RedisCacheStore {
    client: RedisClient,
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisCacheStore {
    /// 创建客户端，此时并不连接
    pub fn new(config: &Config) -> Result<Self, redis::RedisError> {
        Self::open(config.redis_connection_info())
    }

    pub fn open<T: IntoConnectionInfo>(info: T) -> Result<Self, redis::RedisError> {
        Ok(Self {
            client: RedisClient::open(info)?,
            conn: RwLock::new(None),
        })
    }

    /// 建立连接并 PING，失败时直接返回错误
    pub async fn connect(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Connected to Redis, ping response: {}", pong);

        *self.conn.write().await = Some(conn);
        Ok(())
    }

    pub async fn disconnect(&self) {
        if self.conn.write().await.take().is_some() {
            tracing::info!("Disconnected from Redis");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.read().await.is_some()
    }

    async fn connection(&self) -> CacheResult<MultiplexedConnection> {
        match self.conn.read().await.as_ref() {
            Some(conn) => Ok(conn.clone()),
            None => {
                tracing::warn!("Redis command attempted without a live connection");
                Err(CacheError::Unavailable)
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.hset_multiple(key, fields).await?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> CacheResult<HashMap<String, String>> {
        let mut conn = self.connection().await?;
        Ok(conn.hgetall(key).await?)
    }

    async fn hget(&self, key: &str, field: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.hget(key, field).await?)
    }

    async fn sadd(&self, key: &str, member: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.sadd(key, member).await?;
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.srem(key, member).await?;
        Ok(())
    }

    async fn scard(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.connection().await?;
        Ok(conn.scard(key).await?)
    }

    async fn smembers(&self, key: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.smembers(key).await?)
    }

    async fn del(&self, keys: &[String]) -> CacheResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let _: () = conn.del(keys).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        Ok(conn.exists(key).await?)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.expire(key, ttl.as_secs() as i64).await?;
        Ok(())
    }

    async fn flush(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        Ok(())
    }
}
