/// 缓存操作
/// 提供缓存操作的功能实现

// 通用实体缓存
pub mod entity;

// 用户缓存操作
pub mod user;

// 文件缓存操作
pub mod file;

// 重新导出常用操作
pub use entity::EntityCache;
pub use file::FileCache;
pub use user::UserCache;
