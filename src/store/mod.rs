//! 用户存储模块
//!
//! [`UserStore`] 是 Provider 与持久化后端之间唯一的接口。Provider 只依赖
//! 这个 trait，不关心数据放在内存还是数据库里。
//!
//! ## 实现
//!
//! - [`InMemoryUserStore`]: 内存存储，用于测试和单进程场景
//! - `SqliteUserStore`: SQLite 存储（需启用 `sqlite` feature）
//!
//! ## 错误约定
//!
//! - 找不到身份返回 `StorageError::NotFound`
//! - 身份存在但密钥不匹配返回 `StorageError::InvalidCredentials`
//! - 后端故障原样返回，不做重试

use async_trait::async_trait;

use crate::error::Result;

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod user;

pub use memory::InMemoryUserStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteUserStore;
pub use user::User;

/// 用户存储 trait
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 按登录名与密钥查找用户
    async fn find_user_by_credentials(&self, username: &str, secret: &str) -> Result<User>;

    /// 按 API Key 查找用户
    async fn find_user_by_api_key(&self, api_key: &str) -> Result<User>;

    /// 保存为用户签发的 Refresh Token
    async fn update_refresh_token(&self, user_id: &str, refresh_token: &str) -> Result<()>;

    /// 按 Refresh Token 查找用户
    async fn validate_refresh_token(&self, refresh_token: &str) -> Result<User>;
}
