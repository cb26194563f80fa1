use serde::{Deserialize, Serialize};

use super::CacheEntity;
use crate::cache::error::{CacheError, CacheResult};

/// 写入缓存的快照信封
#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    body: &'a T,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Deserialize)]
struct Body<T> {
    body: T,
}

/// 把实体编码成带版本号的 JSON 快照
pub fn encode_snapshot<E: CacheEntity>(entity: &E) -> CacheResult<String> {
    let envelope = Envelope {
        version: E::SCHEMA_VERSION,
        body: entity,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// 解码快照，版本不一致时返回 `SchemaMismatch`
pub fn decode_snapshot<E: CacheEntity>(raw: &str) -> CacheResult<E> {
    let header: Header = serde_json::from_str(raw)?;
    if header.version != E::SCHEMA_VERSION {
        return Err(CacheError::SchemaMismatch {
            expected: E::SCHEMA_VERSION,
            found: header.version,
        });
    }
    let body: Body<E> = serde_json::from_str(raw)?;
    Ok(body.body)
}
