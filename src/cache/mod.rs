// 缓存模块
// 写穿/读穿缓存，保持 Redis 与数据库一致

pub mod consistency;
pub mod error;
pub mod keys;
pub mod models;
pub mod operations;
pub mod store;

// 重新导出常用类型和函数，方便其他模块使用
pub use consistency::{ConsistencyCoordinator, Listing, ListingSource, OwnerListing};
pub use error::{CacheError, CacheResult};
pub use models::{CacheEntity, OwnedEntity};
pub use operations::{EntityCache, FileCache, UserCache};
pub use store::{CacheStore, MemoryCacheStore, RedisCacheStore};
