//! Token Claims 模块
//!
//! 定义 access token 与 refresh token 的载荷结构。
//!
//! 时间字段使用 [`NumericDate`]：毫秒精度的 UTC 时间点。整秒时序列化为
//! JSON 整数，否则序列化为带小数的秒数，因此亚秒级的有效期也能被准确验证。

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// NumericDate
// ============================================================================

/// JWT 时间戳（毫秒精度）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericDate(DateTime<Utc>);

impl NumericDate {
    /// 从 `DateTime<Utc>` 创建，精度截断到毫秒
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        let truncated = DateTime::from_timestamp_millis(datetime.timestamp_millis()).unwrap_or(datetime);
        Self(truncated)
    }

    /// 从 Unix 秒创建，超出范围时返回 `None`
    pub fn from_unix_seconds(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self)
    }

    /// 从 Unix 毫秒创建，超出范围时返回 `None`
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// 转换为 `DateTime<Utc>`
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Unix 秒（向下取整）
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }

    /// Unix 毫秒
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl From<DateTime<Utc>> for NumericDate {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}

impl From<NumericDate> for DateTime<Utc> {
    fn from(date: NumericDate) -> Self {
        date.0
    }
}

impl Serialize for NumericDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = self.0.timestamp_millis();
        if millis % 1000 == 0 {
            serializer.serialize_i64(millis / 1000)
        } else {
            serializer.serialize_f64(millis as f64 / 1000.0)
        }
    }
}

impl<'de> Deserialize<'de> for NumericDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericDateVisitor)
    }
}

struct NumericDateVisitor;

impl<'de> Visitor<'de> for NumericDateVisitor {
    type Value = NumericDate;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a unix timestamp in seconds")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        NumericDate::from_unix_seconds(v).ok_or_else(|| E::custom("timestamp out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let seconds = i64::try_from(v).map_err(|_| E::custom("timestamp out of range"))?;
        self.visit_i64(seconds)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom("timestamp must be finite"));
        }
        let millis = (v * 1000.0).round();
        if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
            return Err(E::custom("timestamp out of range"));
        }
        NumericDate::from_unix_millis(millis as i64)
            .ok_or_else(|| E::custom("timestamp out of range"))
    }
}

// ============================================================================
// 时间字段访问
// ============================================================================

/// 统一访问 claims 中的时间字段
pub trait TimeClaims {
    /// 过期时间
    fn expires_at(&self) -> Option<NumericDate>;

    /// 签发时间
    fn issued_at(&self) -> Option<NumericDate> {
        None
    }

    /// 生效时间
    fn not_before(&self) -> Option<NumericDate> {
        None
    }
}

// ============================================================================
// Access Token Claims
// ============================================================================

/// Access Token 的 Claims
///
/// 每次签发时根据 [`AuthOptions`](crate::AuthOptions) 重新构造，签名后不再修改。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Claims {
    /// 签发者
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// 主题
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// 签发时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<NumericDate>,

    /// 生效时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<NumericDate>,

    /// 过期时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<NumericDate>,

    /// 角色
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,

    /// 权限范围
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scopes: String,

    /// 自定义字段
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// 获取自定义字段值
    pub fn get_custom<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.custom
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

impl TimeClaims for Claims {
    fn expires_at(&self) -> Option<NumericDate> {
        self.exp
    }

    fn issued_at(&self) -> Option<NumericDate> {
        self.iat
    }

    fn not_before(&self) -> Option<NumericDate> {
        self.nbf
    }
}

// ============================================================================
// Refresh Token Claims
// ============================================================================

/// Refresh Token 的 Claims，只携带用户名和过期时间
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<NumericDate>,
}

impl TimeClaims for RefreshClaims {
    fn expires_at(&self) -> Option<NumericDate> {
        self.exp
    }
}
