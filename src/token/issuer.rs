//! Token 签发模块
//!
//! 根据 [`AuthOptions`] 构造 claims 并使用 HMAC 签名。
//!
//! ## 示例
//!
//! ```rust
//! use responsible_auth::AuthOptions;
//! use responsible_auth::token::{create_access_token, validate};
//!
//! let options = AuthOptions::new("my-secret-key-at-least-32-bytes!")
//!     .with_subject("user123")
//!     .with_role("admin");
//!
//! let token = create_access_token(&options).unwrap();
//! let validated = validate(token.as_str(), &options).unwrap();
//! assert_eq!(validated.claims().sub.as_deref(), Some("user123"));
//! ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use tracing::debug;

use super::claims::{Claims, NumericDate, RefreshClaims};
use super::jwt::Token;
use crate::error::{ConfigError, Result, TokenError};
use crate::options::{
    AuthOptions, DEFAULT_ISSUER, default_refresh_token_duration, default_token_duration,
};

/// 签发 Access Token
///
/// 密钥为空或仍为占位值 `"required"` 时返回 `ConfigInvalid`。
/// `token_duration` 为零时使用默认的 15 分钟。
pub fn create_access_token(options: &AuthOptions) -> Result<Token<Claims>> {
    create_access_token_at(options, Utc::now())
}

/// 以指定时间作为“当前时间”签发 Access Token
pub fn create_access_token_at(options: &AuthOptions, now: DateTime<Utc>) -> Result<Token<Claims>> {
    options.check_secret()?;

    let now = NumericDate::from_datetime(now);
    let duration = if options.token_duration == Duration::zero() {
        default_token_duration()
    } else {
        options.token_duration
    };

    let issuer = if options.issuer.is_empty() {
        DEFAULT_ISSUER.to_string()
    } else {
        options.issuer.clone()
    };

    let claims = Claims {
        iss: Some(issuer),
        sub: (!options.subject.is_empty()).then(|| options.subject.clone()),
        iat: Some(override_or_now(options.issued_at, now, "issued_at")?),
        nbf: Some(override_or_now(options.not_before, now, "not_before")?),
        exp: Some(add_duration(now, duration, "token_duration")?),
        role: options.role.clone(),
        scopes: options.scopes.clone(),
        custom: options.custom_claims.clone(),
    };

    let token = sign(claims, options)?;
    debug!(
        issuer = token.claims().iss.as_deref().unwrap_or_default(),
        algorithm = %token.algorithm(),
        expires_at = ?token.expires_at(),
        "access token issued"
    );
    Ok(token)
}

/// 签发 Refresh Token
///
/// Claims 只包含 `username` 与 `exp`。
/// `refresh_token_duration` 为零时使用默认的 7 天，而不是立即过期。
pub fn create_refresh_token(username: &str, options: &AuthOptions) -> Result<Token<RefreshClaims>> {
    create_refresh_token_at(username, options, Utc::now())
}

/// 以指定时间作为“当前时间”签发 Refresh Token
pub fn create_refresh_token_at(
    username: &str,
    options: &AuthOptions,
    now: DateTime<Utc>,
) -> Result<Token<RefreshClaims>> {
    options.check_secret()?;

    let now = NumericDate::from_datetime(now);
    let duration = if options.refresh_token_duration == Duration::zero() {
        default_refresh_token_duration()
    } else {
        options.refresh_token_duration
    };

    let claims = RefreshClaims {
        username: username.to_string(),
        exp: Some(add_duration(now, duration, "refresh_token_duration")?),
    };

    let token = sign(claims, options)?;
    debug!(
        algorithm = %token.algorithm(),
        expires_at = ?token.expires_at(),
        "refresh token issued"
    );
    Ok(token)
}

fn sign<C: Serialize>(claims: C, options: &AuthOptions) -> Result<Token<C>> {
    let header = Header::new(options.algorithm.into());
    let key = EncodingKey::from_secret(options.secret_key.as_bytes());

    let raw = encode(&header, &claims, &key)
        .map_err(|e| TokenError::EncodingFailed(format!("failed to encode JWT: {}", e)))?;

    Ok(Token::new(raw, options.algorithm, claims))
}

fn override_or_now(value: Option<i64>, now: NumericDate, key: &str) -> Result<NumericDate> {
    match value {
        Some(seconds) => NumericDate::from_unix_seconds(seconds).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: "timestamp out of range".to_string(),
            }
            .into()
        }),
        None => Ok(now),
    }
}

fn add_duration(now: NumericDate, duration: Duration, key: &str) -> Result<NumericDate> {
    now.as_datetime()
        .checked_add_signed(duration)
        .map(NumericDate::from_datetime)
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: "duration out of range".to_string(),
            }
            .into()
        })
}
