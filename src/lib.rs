//! # responsible-auth
//!
//! 可插拔的凭证与 Token 签发库。
//!
//! 根据调用方提供的凭证（Basic Auth 字符串或 API Key）在外部用户存储中解析身份，
//! 签发有时效的 access token 和更长期的 refresh token，并在之后验证或续期。
//!
//! ## 功能特性
//!
//! - **Token 生命周期**: claims 构造、HMAC 签名、过期/生效时间验证、时钟偏差容忍
//! - **Refresh 交换**: 使用 refresh token 换取新的 access token
//! - **Provider 抽象**: Basic Auth 与 API Key 两种凭证方案
//! - **存储抽象**: 内存存储与 SQLite 存储
//!
//! ## Features
//!
//! - `sqlite` - 启用 SQLite 用户存储（默认启用）
//!
//! ## Token 示例
//!
//! ```rust
//! use chrono::Duration;
//! use responsible_auth::{AuthOptions, create_access_token, validate};
//!
//! let options = AuthOptions::new("my-secret-key-at-least-32-bytes!")
//!     .with_subject("user123")
//!     .with_token_duration(Duration::minutes(30))
//!     .with_token_leeway(Duration::seconds(5));
//!
//! let token = create_access_token(&options).unwrap();
//! let validated = validate(token.as_str(), &options).unwrap();
//! assert_eq!(validated.claims().sub.as_deref(), Some("user123"));
//! ```
//!
//! ## 登录示例
//!
//! ```rust
//! use std::sync::Arc;
//! use responsible_auth::{Auth, AuthOptions, BasicAuthProvider, InMemoryUserStore, User};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(
//!     InMemoryUserStore::new().with_user(User::new(1, "test@example.com", "pass")),
//! );
//! let auth: Auth<BasicAuthProvider> =
//!     Auth::new(store, AuthOptions::new("my-secret-key-at-least-32-bytes!"));
//!
//! let response = auth.login("dGVzdEBleGFtcGxlLmNvbTpwYXNz").await.unwrap();
//! assert!(auth.validate(&response.access_token).is_ok());
//! # });
//! ```

pub mod auth;
pub mod crypto;
pub mod error;
pub mod options;
pub mod provider;
pub mod store;
pub mod token;

pub use auth::Auth;
pub use error::{Error, ErrorKind, Result};
pub use options::AuthOptions;

// ============================================================================
// Token 相关导出
// ============================================================================

pub use token::{
    Claims, JwtAlgorithm, NumericDate, RefreshClaims, TimeClaims, Token, TokenResponse,
    create_access_token, create_refresh_token, grant_refresh_token, validate,
};

// ============================================================================
// Provider 相关导出
// ============================================================================

pub use provider::{ApiKeyAuthProvider, AuthProvider, BasicAuthProvider, Credentials};

// ============================================================================
// 存储相关导出
// ============================================================================

#[cfg(feature = "sqlite")]
pub use store::SqliteUserStore;
pub use store::{InMemoryUserStore, User, UserStore};

// ============================================================================
// 工具函数导出
// ============================================================================

pub use crypto::{constant_time_compare, constant_time_compare_str};
