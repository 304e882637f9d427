//! 认证配置模块
//!
//! [`AuthOptions`] 是一次签发/验证所需的全部配置：签名密钥、各类有效期、
//! 时钟偏差容忍度以及写入 access token 的 claims。
//!
//! 配置值在构造 Provider 时一次性绑定，之后不再修改；需要不同配置时，
//! 构造新的值并通过 `with_options` 重新绑定。
//!
//! ## 示例
//!
//! ```rust
//! use chrono::Duration;
//! use responsible_auth::AuthOptions;
//!
//! let options = AuthOptions::new("my-secret-key-at-least-32-bytes!")
//!     .with_token_duration(Duration::minutes(30))
//!     .with_issuer("my-app")
//!     .with_role("admin")
//!     .with_custom_claim("department", "engineering");
//!
//! assert!(options.check_secret().is_ok());
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConfigError, Result};
use crate::token::jwt::JwtAlgorithm;

/// 密钥占位值，配置模板中的 `required` 不能用于签名
pub const SECRET_PLACEHOLDER: &str = "required";

/// 未指定签发者时使用的默认值
pub const DEFAULT_ISSUER: &str = "default-issuer";

/// 环境变量前缀
pub const ENV_PREFIX: &str = "RESPONSIBLE_AUTH_";

/// 认证配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthOptions {
    /// 签名密钥
    pub secret_key: String,

    /// 签名算法（仅 HMAC 族）
    #[serde(default)]
    pub algorithm: JwtAlgorithm,

    /// Access Token 有效期（为零时签发使用 15 分钟）
    #[serde(default = "default_token_duration", with = "duration_millis")]
    pub token_duration: Duration,

    /// Refresh Token 有效期（为零时签发使用 7 天）
    #[serde(default = "default_refresh_token_duration", with = "duration_millis")]
    pub refresh_token_duration: Duration,

    /// 验证过期时间时允许的时钟偏差
    #[serde(default = "Duration::zero", with = "duration_millis")]
    pub token_leeway: Duration,

    /// Cookie 有效期
    #[serde(default = "default_cookie_duration", with = "duration_millis")]
    pub cookie_duration: Duration,

    /// 签发者
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub issuer: String,

    /// 主题
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject: String,

    /// 签发时间覆盖值（Unix 秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,

    /// 生效时间覆盖值（Unix 秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<i64>,

    /// 角色
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,

    /// 权限范围，原样写入 token
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scopes: String,

    /// 自定义 claims
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom_claims: HashMap<String, serde_json::Value>,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            secret_key: SECRET_PLACEHOLDER.to_string(),
            algorithm: JwtAlgorithm::default(),
            token_duration: default_token_duration(),
            refresh_token_duration: default_refresh_token_duration(),
            token_leeway: Duration::zero(),
            cookie_duration: default_cookie_duration(),
            issuer: String::new(),
            subject: String::new(),
            issued_at: None,
            not_before: None,
            role: String::new(),
            scopes: String::new(),
            custom_claims: HashMap::new(),
        }
    }
}

impl AuthOptions {
    /// 使用签名密钥创建配置，其余字段取默认值
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    /// 检查签名密钥是否可用
    pub fn check_secret(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::MissingSecret.into());
        }
        if self.secret_key == SECRET_PLACEHOLDER {
            return Err(ConfigError::PlaceholderSecret.into());
        }
        Ok(())
    }

    /// 设置签名密钥
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = secret_key.into();
        self
    }

    /// 设置签名算法
    pub fn with_algorithm(mut self, algorithm: JwtAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 设置 Access Token 有效期
    pub fn with_token_duration(mut self, duration: Duration) -> Self {
        self.token_duration = duration;
        self
    }

    /// 设置 Refresh Token 有效期
    pub fn with_refresh_token_duration(mut self, duration: Duration) -> Self {
        self.refresh_token_duration = duration;
        self
    }

    /// 设置时钟偏差容忍度
    pub fn with_token_leeway(mut self, leeway: Duration) -> Self {
        self.token_leeway = leeway;
        self
    }

    /// 设置 Cookie 有效期
    pub fn with_cookie_duration(mut self, duration: Duration) -> Self {
        self.cookie_duration = duration;
        self
    }

    /// 设置签发者
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// 设置主题
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// 设置签发时间（Unix 秒）
    pub fn with_issued_at(mut self, issued_at: i64) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    /// 设置生效时间（Unix 秒）
    pub fn with_not_before(mut self, not_before: i64) -> Self {
        self.not_before = Some(not_before);
        self
    }

    /// 设置角色
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// 设置权限范围
    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = scopes.into();
        self
    }

    /// 添加自定义 claim
    ///
    /// 无法序列化为 JSON 的值会被忽略。
    pub fn with_custom_claim<V: Serialize>(mut self, key: impl Into<String>, value: V) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.custom_claims.insert(key.into(), json_value);
        }
        self
    }

    /// 从环境变量加载配置
    ///
    /// 若当前目录存在 `.env` 文件会先加载它。未设置的变量保持默认值。
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// `lookup` 接收完整的变量名（含 `RESPONSIBLE_AUTH_` 前缀）。
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut options = Self::default();

        if let Some(secret) = get("SECRET_KEY") {
            options.secret_key = secret;
        }
        if let Some(algorithm) = get("ALGORITHM") {
            options.algorithm = algorithm
                .parse()
                .map_err(|message| invalid_value("ALGORITHM", message))?;
        }
        if let Some(value) = get("TOKEN_DURATION_SECS") {
            options.token_duration = parse_seconds("TOKEN_DURATION_SECS", &value)?;
        }
        if let Some(value) = get("REFRESH_TOKEN_DURATION_SECS") {
            options.refresh_token_duration = parse_seconds("REFRESH_TOKEN_DURATION_SECS", &value)?;
        }
        if let Some(value) = get("TOKEN_LEEWAY_SECS") {
            options.token_leeway = parse_seconds("TOKEN_LEEWAY_SECS", &value)?;
        }
        if let Some(value) = get("COOKIE_DURATION_SECS") {
            options.cookie_duration = parse_seconds("COOKIE_DURATION_SECS", &value)?;
        }
        if let Some(issuer) = get("ISSUER") {
            options.issuer = issuer;
        }
        if let Some(subject) = get("SUBJECT") {
            options.subject = subject;
        }
        if let Some(role) = get("ROLE") {
            options.role = role;
        }
        if let Some(scopes) = get("SCOPES") {
            options.scopes = scopes;
        }

        Ok(options)
    }
}

// ============================================================================
// 默认值与辅助函数
// ============================================================================

pub(crate) fn default_token_duration() -> Duration {
    Duration::minutes(15)
}

pub(crate) fn default_refresh_token_duration() -> Duration {
    Duration::days(7)
}

fn default_cookie_duration() -> Duration {
    Duration::hours(24)
}

fn invalid_value(name: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{}{}", ENV_PREFIX, name),
        message: message.into(),
    }
}

fn parse_seconds(name: &str, value: &str) -> Result<Duration> {
    let seconds: i64 = value
        .trim()
        .parse()
        .map_err(|e| invalid_value(name, format!("expected whole seconds: {}", e)))?;

    Duration::try_seconds(seconds)
        .ok_or_else(|| invalid_value(name, "duration out of range").into())
}

/// 以毫秒整数序列化 `chrono::Duration`
mod duration_millis {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        Duration::try_milliseconds(millis)
            .ok_or_else(|| D::Error::custom("duration out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_uses_placeholder_secret() {
        let options = AuthOptions::default();
        assert_eq!(options.secret_key, SECRET_PLACEHOLDER);
        assert!(matches!(
            options.check_secret(),
            Err(Error::Config(ConfigError::PlaceholderSecret))
        ));
    }

    #[test]
    fn test_check_secret() {
        assert!(AuthOptions::new("secret").check_secret().is_ok());

        let err = AuthOptions::new("").check_secret().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_builder_methods() {
        let options = AuthOptions::new("secret")
            .with_algorithm(JwtAlgorithm::HS512)
            .with_token_duration(Duration::minutes(5))
            .with_refresh_token_duration(Duration::days(1))
            .with_token_leeway(Duration::seconds(30))
            .with_issuer("issuer")
            .with_subject("subject")
            .with_issued_at(100)
            .with_not_before(200)
            .with_role("admin")
            .with_scopes("read,write")
            .with_custom_claim("level", 5);

        assert_eq!(options.algorithm, JwtAlgorithm::HS512);
        assert_eq!(options.token_duration, Duration::minutes(5));
        assert_eq!(options.token_leeway, Duration::seconds(30));
        assert_eq!(options.issued_at, Some(100));
        assert_eq!(options.not_before, Some(200));
        assert_eq!(options.custom_claims.get("level"), Some(&serde_json::json!(5)));
    }

    #[test]
    fn test_serde_durations_as_millis() {
        let options = AuthOptions::new("secret").with_token_duration(Duration::milliseconds(100));
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["token_duration"], serde_json::json!(100));

        let parsed: AuthOptions = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, options);
    }

    #[test]
    fn test_deserialize_minimal() {
        let options: AuthOptions = serde_json::from_str(r#"{"secret_key":"abc"}"#).unwrap();
        assert_eq!(options.secret_key, "abc");
        assert_eq!(options.token_duration, Duration::minutes(15));
        assert_eq!(options.token_leeway, Duration::zero());
    }

    #[test]
    fn test_from_lookup() {
        let options = AuthOptions::from_lookup(lookup_from(&[
            ("RESPONSIBLE_AUTH_SECRET_KEY", "env-secret"),
            ("RESPONSIBLE_AUTH_ALGORITHM", "HS384"),
            ("RESPONSIBLE_AUTH_TOKEN_DURATION_SECS", "3600"),
            ("RESPONSIBLE_AUTH_TOKEN_LEEWAY_SECS", "30"),
            ("RESPONSIBLE_AUTH_ISSUER", "env-issuer"),
            ("RESPONSIBLE_AUTH_SCOPES", "read"),
        ]))
        .unwrap();

        assert_eq!(options.secret_key, "env-secret");
        assert_eq!(options.algorithm, JwtAlgorithm::HS384);
        assert_eq!(options.token_duration, Duration::hours(1));
        assert_eq!(options.token_leeway, Duration::seconds(30));
        assert_eq!(options.issuer, "env-issuer");
        assert_eq!(options.scopes, "read");
        assert_eq!(options.refresh_token_duration, Duration::days(7));
    }

    #[test]
    fn test_from_lookup_invalid_value() {
        let err = AuthOptions::from_lookup(lookup_from(&[(
            "RESPONSIBLE_AUTH_TOKEN_DURATION_SECS",
            "fifteen",
        )]))
        .unwrap_err();

        match err {
            Error::Config(ConfigError::InvalidValue { key, .. }) => {
                assert_eq!(key, "RESPONSIBLE_AUTH_TOKEN_DURATION_SECS");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_lookup_rejects_asymmetric_algorithm() {
        let result =
            AuthOptions::from_lookup(lookup_from(&[("RESPONSIBLE_AUTH_ALGORITHM", "RS256")]));
        assert!(result.is_err());
    }
}
