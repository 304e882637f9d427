//! 认证 Provider 模块
//!
//! Provider 把一种凭证方案（Basic Auth、API Key……）接入统一的 token 生命周期。
//! 每个 Provider 在构造时绑定一个 [`UserStore`] 和一份 [`AuthOptions`]，
//! 之后不再修改；需要不同配置时通过 `with_options` / `with_store` 得到新值。
//!
//! ## 示例
//!
//! ```rust
//! use std::sync::Arc;
//! use responsible_auth::{AuthOptions, AuthProvider, BasicAuthProvider, InMemoryUserStore, User};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(
//!     InMemoryUserStore::new().with_user(User::new(1, "test@example.com", "pass")),
//! );
//! let provider = BasicAuthProvider::new(store, AuthOptions::new("my-secret-key-at-least-32-bytes!"));
//!
//! let credentials = provider.decode("dGVzdEBleGFtcGxlLmNvbTpwYXNz").await.unwrap();
//! assert_eq!(credentials.username, "test@example.com");
//! # });
//! ```

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::options::AuthOptions;
use crate::store::{User, UserStore};
use crate::token::{Claims, RefreshClaims, Token};

pub mod api_key;
pub mod basic;

pub use api_key::ApiKeyAuthProvider;
pub use basic::BasicAuthProvider;

/// 解码后的凭证
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// 登录名
    pub username: String,
    /// 密钥（Basic Auth 的密码或 API Key 本身）
    pub secret: String,
}

impl Credentials {
    /// 创建凭证
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Refresh Token 中记录的用户名：显示名，缺失时使用登录名
pub(crate) fn refresh_username(user: &User) -> String {
    if user.name.is_empty() {
        user.login_name()
    } else {
        user.name.clone()
    }
}

/// 认证 Provider trait
///
/// 每个实现独立提供全部操作，不依赖默认实现。
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// 绑定存储与配置，创建 Provider
    fn new(store: Arc<dyn UserStore>, options: AuthOptions) -> Self
    where
        Self: Sized;

    /// 替换配置，返回新的 Provider
    fn with_options(self, options: AuthOptions) -> Self
    where
        Self: Sized;

    /// 替换存储，返回新的 Provider
    fn with_store(self, store: Arc<dyn UserStore>) -> Self
    where
        Self: Sized;

    /// 凭证方案名
    fn scheme(&self) -> &'static str;

    /// 当前绑定的配置
    fn options(&self) -> &AuthOptions;

    /// 当前绑定的存储
    fn store(&self) -> &Arc<dyn UserStore>;

    /// 解码凭证
    async fn decode(&self, credential: &str) -> Result<Credentials>;

    /// 校验身份后签发 Access Token
    async fn create_access_token(&self, user_id: &str, secret: &str) -> Result<Token<Claims>>;

    /// 校验身份后签发 Refresh Token，并保存到存储
    async fn create_refresh_token(&self, user_id: &str, secret: &str) -> Result<Token<RefreshClaims>>;

    /// 使用 Refresh Token 换取新的 Access Token
    fn grant_refresh_token(&self, refresh_token: &str) -> Result<Token<Claims>>;

    /// 验证 Access Token
    fn validate(&self, token: &str) -> Result<Token<Claims>>;
}
