//! Token 响应模型
//!
//! 把一次登录签发的 access token 与 refresh token 整理成调用方可以直接
//! 序列化返回的结构。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::claims::{Claims, RefreshClaims};
use super::jwt::Token;

/// 登录或刷新后返回给调用方的 Token 信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// Token 类型（固定为 "Bearer"）
    pub token_type: String,
    /// Access Token 剩余有效秒数，不会为负
    pub expires_in: i64,
    /// 权限范围
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Cookie 有效秒数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_max_age: Option<i64>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TokenResponse {
    /// 根据一对 token 构造响应
    pub fn new(access: &Token<Claims>, refresh: &Token<RefreshClaims>) -> Self {
        Self::new_at(access, refresh, Utc::now())
    }

    /// 以指定时间构造响应
    pub fn new_at(access: &Token<Claims>, refresh: &Token<RefreshClaims>, now: DateTime<Utc>) -> Self {
        let expires_in = access
            .expires_at()
            .map(|exp| (exp - now).num_seconds().max(0))
            .unwrap_or(0);

        let scope = access.claims().scopes.trim();

        Self {
            access_token: access.as_str().to_string(),
            refresh_token: refresh.as_str().to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
            scope: (!scope.is_empty()).then(|| scope.to_string()),
            cookie_max_age: None,
            created_at: now,
            updated_at: None,
        }
    }

    /// 设置 Cookie 有效期，负值按零处理
    pub fn with_cookie_duration(mut self, duration: Duration) -> Self {
        self.cookie_max_age = Some(duration.num_seconds().max(0));
        self
    }

    /// 替换 access token（refresh 流程使用），并记录更新时间
    pub fn refreshed(mut self, access: &Token<Claims>, now: DateTime<Utc>) -> Self {
        self.access_token = access.as_str().to_string();
        self.expires_in = access
            .expires_at()
            .map(|exp| (exp - now).num_seconds().max(0))
            .unwrap_or(0);
        let scope = access.claims().scopes.trim();
        self.scope = (!scope.is_empty()).then(|| scope.to_string());
        self.updated_at = Some(now);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::AuthOptions;
    use crate::token::issuer::{create_access_token_at, create_refresh_token_at};
    use chrono::TimeZone;

    const TEST_SECRET: &str = "test-secret-key-32-characters!";

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_response_from_tokens() {
        let options = AuthOptions::new(TEST_SECRET).with_scopes("  read write ");
        let access = create_access_token_at(&options, fixed_now()).unwrap();
        let refresh = create_refresh_token_at("alice", &options, fixed_now()).unwrap();

        let response = TokenResponse::new_at(&access, &refresh, fixed_now())
            .with_cookie_duration(Duration::hours(24));

        assert_eq!(response.access_token, access.as_str());
        assert_eq!(response.refresh_token, refresh.as_str());
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 15 * 60);
        assert_eq!(response.scope.as_deref(), Some("read write"));
        assert_eq!(response.cookie_max_age, Some(86_400));
        assert_eq!(response.updated_at, None);
    }

    #[test]
    fn test_expires_in_never_negative() {
        let options = AuthOptions::new(TEST_SECRET).with_token_duration(Duration::seconds(-60));
        let access = create_access_token_at(&options, fixed_now()).unwrap();
        let refresh = create_refresh_token_at("alice", &options, fixed_now()).unwrap();

        let response = TokenResponse::new_at(&access, &refresh, fixed_now());
        assert_eq!(response.expires_in, 0);
        assert_eq!(response.scope, None);
    }

    #[test]
    fn test_refreshed_updates_access_token() {
        let options = AuthOptions::new(TEST_SECRET);
        let access = create_access_token_at(&options, fixed_now()).unwrap();
        let refresh = create_refresh_token_at("alice", &options, fixed_now()).unwrap();
        let response = TokenResponse::new_at(&access, &refresh, fixed_now());

        let later = fixed_now() + Duration::minutes(5);
        let renewed = create_access_token_at(&options.clone().with_scopes("admin"), later).unwrap();
        let response = response.refreshed(&renewed, later);

        assert_eq!(response.access_token, renewed.as_str());
        assert_eq!(response.refresh_token, refresh.as_str());
        assert_eq!(response.expires_in, 15 * 60);
        assert_eq!(response.scope.as_deref(), Some("admin"));
        assert_eq!(response.updated_at, Some(later));
    }
}
