//! JWT 封装模块
//!
//! [`Token`] 包装已签名的字符串以及签发（或解析）时使用的 claims。
//! 它只是一个便于访问的视图：访问器不会重新验证签名，
//! 验证器总是重新解析原始字符串而不信任这个值。
//!
//! ## 支持的算法
//!
//! 仅支持 HMAC 族：
//!
//! - **HS256**: HMAC-SHA256（默认）
//! - **HS384**: HMAC-SHA384
//! - **HS512**: HMAC-SHA512

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::claims::{Claims, TimeClaims};
use crate::error::TokenError;

/// JWT 签名算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JwtAlgorithm {
    /// HMAC-SHA256（默认）
    #[default]
    HS256,
    /// HMAC-SHA384
    HS384,
    /// HMAC-SHA512
    HS512,
}

impl JwtAlgorithm {
    /// 所有允许的算法
    pub const ALL: [JwtAlgorithm; 3] = [JwtAlgorithm::HS256, JwtAlgorithm::HS384, JwtAlgorithm::HS512];

    /// JOSE 头部中的算法名
    pub fn as_str(&self) -> &'static str {
        match self {
            JwtAlgorithm::HS256 => "HS256",
            JwtAlgorithm::HS384 => "HS384",
            JwtAlgorithm::HS512 => "HS512",
        }
    }
}

impl fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JwtAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "HS256" => Ok(JwtAlgorithm::HS256),
            "HS384" => Ok(JwtAlgorithm::HS384),
            "HS512" => Ok(JwtAlgorithm::HS512),
            other => Err(format!("unsupported signing algorithm '{}'", other)),
        }
    }
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// 已签名的 Token
#[derive(Debug, Clone, PartialEq)]
pub struct Token<C = Claims> {
    raw: String,
    algorithm: JwtAlgorithm,
    claims: C,
}

impl<C> Token<C> {
    pub(crate) fn new(raw: String, algorithm: JwtAlgorithm, claims: C) -> Self {
        Self {
            raw,
            algorithm,
            claims,
        }
    }

    /// 原始签名字符串
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 取出原始签名字符串
    pub fn into_string(self) -> String {
        self.raw
    }

    /// 签名算法
    pub fn algorithm(&self) -> JwtAlgorithm {
        self.algorithm
    }

    /// Claims 引用
    pub fn claims(&self) -> &C {
        &self.claims
    }

    /// 取出 Claims
    pub fn into_claims(self) -> C {
        self.claims
    }
}

impl<C: TimeClaims> Token<C> {
    /// 过期时间
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at().map(|d| d.as_datetime())
    }

    /// 签发时间
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.claims.issued_at().map(|d| d.as_datetime())
    }

    /// 生效时间
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.claims.not_before().map(|d| d.as_datetime())
    }
}

impl<C> fmt::Display for Token<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl<C> AsRef<str> for Token<C> {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

/// 读取并检查头部声明的算法
///
/// 在验证签名之前执行：非 HMAC 算法（包括 `none`）一律拒绝。
/// `jsonwebtoken::decode_header` 无法表示 `none` 等未知算法名，
/// 会把它们与缺少 `alg` 的头部一并报告为 JSON 错误，因此这里自行读取 `alg`。
pub(crate) fn inspect_algorithm(token: &str) -> std::result::Result<JwtAlgorithm, TokenError> {
    if token.is_empty() {
        return Err(TokenError::Malformed("token is empty".to_string()));
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(
            "token must have three segments".to_string(),
        ));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(segments[0].trim_end_matches('='))
        .map_err(|e| TokenError::Malformed(format!("invalid header encoding: {}", e)))?;
    let header: RawHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| TokenError::Malformed(format!("invalid header: {}", e)))?;

    let alg = header
        .alg
        .ok_or_else(|| TokenError::Malformed("header is missing 'alg'".to_string()))?;

    alg.parse().map_err(|_| TokenError::DisallowedAlgorithm(alg))
}
