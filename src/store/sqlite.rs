//! SQLite 用户存储
//!
//! 基于 `rusqlite` 与 `tokio-rusqlite`，所有查询在后台连接线程上执行。
//! 表结构沿用 `responsible_api_users`。

use async_trait::async_trait;
use rusqlite::{OptionalExtension, Row};
use tokio_rusqlite::Connection;
use tracing::debug;

use super::{User, UserStore};
use crate::crypto::constant_time_compare_str;
use crate::error::{Error, Result, StorageError};

const CREATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS responsible_api_users (
    account_id    INTEGER PRIMARY KEY,
    name          TEXT    NOT NULL DEFAULT '',
    mail          TEXT    NOT NULL DEFAULT '',
    created       INTEGER NOT NULL DEFAULT 0,
    access        INTEGER NOT NULL DEFAULT 0,
    status        INTEGER NOT NULL DEFAULT 0,
    secret        TEXT    NOT NULL DEFAULT '',
    apikey        TEXT    NOT NULL DEFAULT '',
    refresh_token TEXT
);

CREATE INDEX IF NOT EXISTS idx_responsible_api_users_mail ON responsible_api_users(mail);
CREATE INDEX IF NOT EXISTS idx_responsible_api_users_apikey ON responsible_api_users(apikey);
CREATE INDEX IF NOT EXISTS idx_responsible_api_users_refresh ON responsible_api_users(refresh_token);
"#;

const SELECT_USER: &str = "SELECT account_id, name, mail, created, access, status, secret, apikey, refresh_token \
     FROM responsible_api_users";

// 登录名可以是邮箱或账户 ID；邮箱匹配优先，同级时取账户 ID 最小者
const MATCH_USERNAME: &str = "(mail = ?1 OR CAST(account_id AS TEXT) = ?1) \
     ORDER BY CASE WHEN mail = ?1 THEN 0 ELSE 1 END, account_id";

// 更新时账户 ID 匹配优先
const MATCH_USER_ID: &str = "(mail = ?1 OR CAST(account_id AS TEXT) = ?1) \
     ORDER BY CASE WHEN CAST(account_id AS TEXT) = ?1 THEN 0 ELSE 1 END, account_id";

/// SQLite 用户存储
pub struct SqliteUserStore {
    conn: Connection,
}

impl SqliteUserStore {
    /// 打开数据库并创建表结构
    ///
    /// 使用 `:memory:` 创建内存数据库。
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path.to_string())
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        conn.call(|conn| {
            conn.execute_batch(CREATE_SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(db_error)?;

        Ok(Self { conn })
    }

    /// 创建内存数据库（用于测试）
    pub async fn in_memory() -> Result<Self> {
        Self::new(":memory:").await
    }

    /// 添加或替换用户
    pub async fn insert_user(&self, user: &User) -> Result<()> {
        let account_id = i64::try_from(user.account_id).map_err(|_| {
            StorageError::OperationFailed(format!("account id {} out of range", user.account_id))
        })?;
        let user = user.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT OR REPLACE INTO responsible_api_users
                    (account_id, name, mail, created, access, status, secret, apikey, refresh_token)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                    rusqlite::params![
                        account_id,
                        user.name,
                        user.mail,
                        user.created,
                        user.access,
                        user.status,
                        user.secret,
                        user.api_key,
                        user.refresh_token
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(db_error)
    }

    async fn find_one(&self, filter: &'static str, value: &str) -> Result<Option<User>> {
        let value = value.to_string();
        let sql = format!("{} WHERE {} LIMIT 1", SELECT_USER, filter);

        self.conn
            .call(move |conn| {
                let user = conn
                    .query_row(&sql, [&value], row_to_user)
                    .optional()?;
                Ok(user)
            })
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_user_by_credentials(&self, username: &str, secret: &str) -> Result<User> {
        if username.is_empty() {
            return Err(StorageError::NotFound("user not found".to_string()).into());
        }

        let user = self
            .find_one(MATCH_USERNAME, username)
            .await?
            .ok_or_else(|| StorageError::NotFound("user not found".to_string()))?;

        if !constant_time_compare_str(&user.secret, secret) {
            debug!(account_id = user.account_id, "credential mismatch");
            return Err(StorageError::InvalidCredentials.into());
        }

        Ok(user)
    }

    async fn find_user_by_api_key(&self, api_key: &str) -> Result<User> {
        if api_key.is_empty() {
            return Err(StorageError::NotFound("invalid API key".to_string()).into());
        }

        self.find_one("apikey = ?1", api_key)
            .await?
            .ok_or_else(|| StorageError::NotFound("invalid API key".to_string()).into())
    }

    async fn update_refresh_token(&self, user_id: &str, refresh_token: &str) -> Result<()> {
        let user_id = user_id.to_string();
        let refresh_token = refresh_token.to_string();

        let updated = self
            .conn
            .call(move |conn| {
                let sql = format!(
                    "UPDATE responsible_api_users SET refresh_token = ?2 \
                     WHERE account_id = (SELECT account_id FROM responsible_api_users WHERE {} LIMIT 1)",
                    MATCH_USER_ID
                );
                let count = conn.execute(&sql, rusqlite::params![user_id, refresh_token])?;
                Ok(count)
            })
            .await
            .map_err(db_error)?;

        if updated == 0 {
            return Err(StorageError::NotFound("user not found".to_string()).into());
        }

        debug!(rows = updated, "refresh token stored");
        Ok(())
    }

    async fn validate_refresh_token(&self, refresh_token: &str) -> Result<User> {
        if refresh_token.is_empty() {
            return Err(StorageError::NotFound("invalid refresh token".to_string()).into());
        }

        self.find_one("refresh_token = ?1", refresh_token)
            .await?
            .ok_or_else(|| StorageError::NotFound("invalid refresh token".to_string()).into())
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let account_id: i64 = row.get(0)?;
    let account_id = u64::try_from(account_id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Integer, Box::new(e))
    })?;

    Ok(User {
        account_id,
        name: row.get(1)?,
        mail: row.get(2)?,
        created: row.get(3)?,
        access: row.get(4)?,
        status: row.get(5)?,
        secret: row.get(6)?,
        api_key: row.get(7)?,
        refresh_token: row.get(8)?,
    })
}

fn db_error(err: tokio_rusqlite::Error) -> Error {
    Error::Storage(StorageError::OperationFailed(err.to_string()))
}
