//! Token 模块
//!
//! 负责 token 生命周期：构造 claims、签名、时间窗口验证和 refresh 交换。
//!
//! ## 子模块
//!
//! - **claims**: Access / Refresh Token 的载荷
//! - **jwt**: 已签名 Token 的封装与签名算法
//! - **issuer**: 签发
//! - **validator**: 验证与 refresh 交换
//! - **response**: 返回给调用方的 Token 响应
//!
//! ## 示例
//!
//! ```rust
//! use responsible_auth::AuthOptions;
//! use responsible_auth::token::{create_access_token, create_refresh_token, grant_refresh_token};
//!
//! let options = AuthOptions::new("my-secret-key-at-least-32-bytes!").with_subject("user123");
//!
//! let refresh = create_refresh_token("user123", &options).unwrap();
//! let access = grant_refresh_token(refresh.as_str(), &options).unwrap();
//! assert_eq!(access.claims().sub.as_deref(), Some("user123"));
//! # let _ = create_access_token(&options).unwrap();
//! ```

pub mod claims;
pub mod issuer;
pub mod jwt;
pub mod response;
pub mod validator;

pub use claims::{Claims, NumericDate, RefreshClaims, TimeClaims};
pub use issuer::{
    create_access_token, create_access_token_at, create_refresh_token, create_refresh_token_at,
};
pub use jwt::{JwtAlgorithm, Token};
pub use response::TokenResponse;
pub use validator::{grant_refresh_token, grant_refresh_token_at, validate, validate_at};
