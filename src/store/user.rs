//! 用户身份模型

use serde::{Deserialize, Serialize};
use std::fmt;

/// 用户存储中的一条身份记录
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    /// 账户 ID
    pub account_id: u64,
    /// 显示名
    pub name: String,
    /// 邮箱，同时作为登录名
    pub mail: String,
    /// 创建时间（Unix 秒）
    pub created: i64,
    /// 最近访问时间（Unix 秒）
    pub access: i64,
    /// 账户状态
    pub status: i32,
    /// 登录密钥
    pub secret: String,
    /// API Key
    pub api_key: String,
    /// 最近一次签发的 Refresh Token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl User {
    /// 创建新用户
    pub fn new(account_id: u64, mail: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            account_id,
            mail: mail.into(),
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// 设置显示名
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置 API Key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// 设置账户状态
    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    /// 登录名可以是邮箱或十进制账户 ID，显示名不参与匹配
    pub fn matches_username(&self, username: &str) -> bool {
        self.username_rank(username).is_some()
    }

    /// 登录名匹配的优先级：邮箱为 0，账户 ID 为 1，不匹配为 `None`
    pub(crate) fn username_rank(&self, username: &str) -> Option<u8> {
        if username.is_empty() {
            None
        } else if self.mail == username {
            Some(0)
        } else if self.account_id.to_string() == username {
            Some(1)
        } else {
            None
        }
    }

    /// 用于签发 token 的登录名：邮箱，缺失时使用账户 ID
    pub fn login_name(&self) -> String {
        if self.mail.is_empty() {
            self.account_id.to_string()
        } else {
            self.mail.clone()
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("account_id", &self.account_id)
            .field("name", &self.name)
            .field("mail", &self.mail)
            .field("created", &self.created)
            .field("access", &self.access)
            .field("status", &self.status)
            .field("secret", &"[REDACTED]")
            .field("api_key", &"[REDACTED]")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}
