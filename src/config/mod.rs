use std::env;
use std::time::Duration;

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

/// 配置加载错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_server: String,
    pub redis_port: u16,
    pub redis_db: i64,
    pub redis_user: Option<String>,
    pub redis_password: Option<String>,
    pub redis_cache_expiry_secs: u64,
    pub secret_key: String,
    pub access_token_expire_minutes: u64,
    pub users_open_registration: bool,
    pub api_base_uri: String,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源解析配置，空字符串视为未设置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_server: required("REDIS_SERVER")?,
            redis_port: parse_or(get("REDIS_PORT"), "REDIS_PORT", 6379)?,
            redis_db: parse_or(get("REDIS_DB"), "REDIS_DB", 0)?,
            redis_user: get("REDIS_USER"),
            redis_password: get("REDIS_PASSWORD"),
            redis_cache_expiry_secs: parse_or(
                get("REDIS_CACHE_EXPIRY"),
                "REDIS_CACHE_EXPIRY",
                3600,
            )?,
            secret_key: required("SECRET_KEY")?,
            // 默认7天
            access_token_expire_minutes: parse_or(
                get("ACCESS_TOKEN_EXPIRE_MINUTES"),
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                60 * 24 * 7,
            )?,
            users_open_registration: parse_or(
                get("USERS_OPEN_REGISTRATION"),
                "USERS_OPEN_REGISTRATION",
                true,
            )?,
            api_base_uri: get("API_V1_STR").unwrap_or_else(|| "/api/v1".into()),
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or(get("SERVER_PORT"), "SERVER_PORT", 8000)?,
        })
    }

    /// Redis 连接参数
    ///
    /// 用户名和密码单独传给客户端，不拼进 URL，避免其中的保留字符破坏解析。
    pub fn redis_connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.redis_server.clone(), self.redis_port),
            redis: RedisConnectionInfo {
                db: self.redis_db,
                username: self.redis_user.clone(),
                password: self.redis_password.clone(),
                ..Default::default()
            },
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.redis_cache_expiry_secs)
    }

    pub fn access_token_expiration(&self) -> Duration {
        Duration::from_secs(self.access_token_expire_minutes * 60)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw.clone() }),
        None => Ok(default),
    }
}
