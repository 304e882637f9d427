//! Token 验证模块
//!
//! 验证分两步：
//!
//! 1. **结构与签名**：检查头部算法（仅 HMAC 族），再用 `jsonwebtoken` 验证签名并解析 claims
//! 2. **时间策略**：`exp` 必须存在且未超过容忍窗口，`nbf` 必须存在且不晚于当前时间
//!
//! 缺少 `exp` 或 `nbf` 的 token 一律视为无效。
//!
//! ## Refresh Token 的信任模型
//!
//! [`grant_refresh_token`] 只确认 refresh token 由同一密钥签发且未过期，
//! 然后**完全根据传入的 [`AuthOptions`]** 签发新的 access token。
//! refresh token 中的 `username` 只用于日志，不会与 options 中的主题做比对；
//! 调用方需要自行保证 options 属于该 refresh token 的持有者。

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::claims::{Claims, NumericDate, RefreshClaims, TimeClaims};
use super::issuer::create_access_token_at;
use super::jwt::{JwtAlgorithm, Token, inspect_algorithm};
use crate::error::{Result, TokenError};
use crate::options::AuthOptions;

/// 验证 Access Token
pub fn validate(token: &str, options: &AuthOptions) -> Result<Token<Claims>> {
    validate_at(token, options, Utc::now())
}

/// 以指定时间作为“当前时间”验证 Access Token
pub fn validate_at(token: &str, options: &AuthOptions, now: DateTime<Utc>) -> Result<Token<Claims>> {
    options.check_secret()?;

    let parsed = parse::<Claims>(token, &options.secret_key)?;
    let now = NumericDate::from_datetime(now);
    let leeway = options.token_leeway.max(Duration::zero());

    valid_expiry(parsed.claims(), now, leeway)?;
    valid_not_before(parsed.claims(), now)?;

    debug!(
        algorithm = %parsed.algorithm(),
        subject = parsed.claims().sub.as_deref().unwrap_or_default(),
        "access token validated"
    );
    Ok(parsed)
}

/// 使用 Refresh Token 换取新的 Access Token
///
/// 新 token 的 claims 只来自 `options`，见模块文档中的信任模型说明。
pub fn grant_refresh_token(refresh_token: &str, options: &AuthOptions) -> Result<Token<Claims>> {
    grant_refresh_token_at(refresh_token, options, Utc::now())
}

/// 以指定时间作为“当前时间”执行 refresh 流程
pub fn grant_refresh_token_at(
    refresh_token: &str,
    options: &AuthOptions,
    now: DateTime<Utc>,
) -> Result<Token<Claims>> {
    options.check_secret()?;

    let parsed = parse::<RefreshClaims>(refresh_token, &options.secret_key).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        TokenError::InvalidRefreshToken(e.to_string())
    })?;

    if let Some(exp) = parsed.claims().exp {
        if exp <= NumericDate::from_datetime(now) {
            warn!("refresh token rejected: expired");
            return Err(TokenError::InvalidRefreshToken("refresh token has expired".to_string()).into());
        }
    }

    debug!(
        username = %parsed.claims().username,
        "refresh token accepted, issuing access token from options"
    );
    create_access_token_at(options, now)
}

/// 检查过期时间
///
/// `exp` 缺失视为已过期；`now < exp + leeway` 时有效。
pub(crate) fn valid_expiry<C: TimeClaims>(
    claims: &C,
    now: NumericDate,
    leeway: Duration,
) -> std::result::Result<(), TokenError> {
    let exp = claims.expires_at().ok_or(TokenError::Expired)?;
    match exp.as_datetime().checked_add_signed(leeway) {
        Some(deadline) if now.as_datetime() < deadline => Ok(()),
        None => Ok(()),
        Some(_) => Err(TokenError::Expired),
    }
}

/// 检查生效时间
///
/// `nbf` 缺失视为尚未生效；`nbf <= now` 时有效。
pub(crate) fn valid_not_before<C: TimeClaims>(
    claims: &C,
    now: NumericDate,
) -> std::result::Result<(), TokenError> {
    match claims.not_before() {
        Some(nbf) if nbf <= now => Ok(()),
        _ => Err(TokenError::NotYetValid),
    }
}

fn parse<C: DeserializeOwned>(token: &str, secret: &str) -> std::result::Result<Token<C>, TokenError> {
    let algorithm = inspect_algorithm(token)?;

    // 时间检查由本模块完成
    let mut validation = Validation::new(algorithm.into());
    validation.algorithms = JwtAlgorithm::ALL.iter().map(|a| Algorithm::from(*a)).collect();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<C>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(Token::new(token.to_string(), algorithm, data.claims))
}
