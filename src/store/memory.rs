//! 内存用户存储
//!
//! 用于测试和单进程场景，数据不持久化。

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use super::{User, UserStore};
use crate::crypto::constant_time_compare_str;
use crate::error::{Error, Result, StorageError};

/// 内存用户存储
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<u64, User>>,
}

impl InMemoryUserStore {
    /// 创建空的内存存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加用户（构造时使用）
    pub fn with_user(self, user: User) -> Self {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.account_id, user);
        }
        self
    }

    /// 添加或替换用户
    pub fn insert(&self, user: User) -> Result<()> {
        let mut users = self.users.write().map_err(poisoned)?;
        users.insert(user.account_id, user);
        Ok(())
    }

    /// 按账户 ID 获取用户
    pub fn get(&self, account_id: u64) -> Result<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&account_id).cloned())
    }

    /// 用户数量
    pub fn len(&self) -> Result<usize> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.len())
    }

    /// 是否为空
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

// 邮箱匹配优先于账户 ID，同级时取账户 ID 最小者
fn best_match(users: &HashMap<u64, User>, username: &str) -> Option<u64> {
    users
        .values()
        .filter_map(|u| u.username_rank(username).map(|rank| (rank, u.account_id)))
        .min()
        .map(|(_, account_id)| account_id)
}

// 更新时账户 ID 精确命中优先
fn owner_of(users: &HashMap<u64, User>, user_id: &str) -> Option<u64> {
    user_id
        .parse::<u64>()
        .ok()
        .filter(|id| users.get(id).is_some_and(|u| u.account_id.to_string() == user_id))
        .or_else(|| best_match(users, user_id))
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_user_by_credentials(&self, username: &str, secret: &str) -> Result<User> {
        let users = self.users.read().map_err(poisoned)?;

        let user = best_match(&users, username)
            .and_then(|account_id| users.get(&account_id))
            .ok_or_else(|| StorageError::NotFound("user not found".to_string()))?;

        if !constant_time_compare_str(&user.secret, secret) {
            debug!(account_id = user.account_id, "credential mismatch");
            return Err(StorageError::InvalidCredentials.into());
        }

        Ok(user.clone())
    }

    async fn find_user_by_api_key(&self, api_key: &str) -> Result<User> {
        let users = self.users.read().map_err(poisoned)?;

        users
            .values()
            .find(|u| !u.api_key.is_empty() && constant_time_compare_str(&u.api_key, api_key))
            .cloned()
            .ok_or_else(|| StorageError::NotFound("invalid API key".to_string()).into())
    }

    async fn update_refresh_token(&self, user_id: &str, refresh_token: &str) -> Result<()> {
        let mut users = self.users.write().map_err(poisoned)?;

        let user = owner_of(&users, user_id)
            .and_then(|account_id| users.get_mut(&account_id))
            .ok_or_else(|| StorageError::NotFound("user not found".to_string()))?;

        user.refresh_token = Some(refresh_token.to_string());
        debug!(account_id = user.account_id, "refresh token stored");
        Ok(())
    }

    async fn validate_refresh_token(&self, refresh_token: &str) -> Result<User> {
        let users = self.users.read().map_err(poisoned)?;

        users
            .values()
            .find(|u| {
                u.refresh_token
                    .as_deref()
                    .is_some_and(|stored| constant_time_compare_str(stored, refresh_token))
            })
            .cloned()
            .ok_or_else(|| StorageError::NotFound("invalid refresh token".to_string()).into())
    }
}

fn poisoned<T>(_: PoisonError<T>) -> Error {
    Error::Storage(StorageError::OperationFailed("lock poisoned".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn store() -> InMemoryUserStore {
        InMemoryUserStore::new().with_user(
            User::new(123_456_789, "test@example.com", "test-password-hash")
                .with_name("test-user")
                .with_api_key("api_key_12345")
                .with_status(1),
        )
    }

    #[tokio::test]
    async fn test_find_user_by_credentials() {
        let store = store();

        let user = store
            .find_user_by_credentials("test@example.com", "test-password-hash")
            .await
            .unwrap();
        assert_eq!(user.account_id, 123_456_789);

        let user = store
            .find_user_by_credentials("123456789", "test-password-hash")
            .await
            .unwrap();
        assert_eq!(user.mail, "test@example.com");
    }

    #[tokio::test]
    async fn test_credentials_not_found_vs_mismatch() {
        let store = store();

        let err = store
            .find_user_by_credentials("nobody@example.com", "test-password-hash")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IdentityNotFound);

        let err = store
            .find_user_by_credentials("test@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_find_user_by_api_key() {
        let store = store();

        let user = store.find_user_by_api_key("api_key_12345").await.unwrap();
        assert_eq!(user.account_id, 123_456_789);

        let err = store.find_user_by_api_key("unknown").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IdentityNotFound);

        let err = store.find_user_by_api_key("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IdentityNotFound);
    }

    #[tokio::test]
    async fn test_refresh_token_round_trip() {
        let store = store();

        assert!(store.validate_refresh_token("token-1").await.is_err());

        store.update_refresh_token("123456789", "token-1").await.unwrap();
        let user = store.validate_refresh_token("token-1").await.unwrap();
        assert_eq!(user.refresh_token.as_deref(), Some("token-1"));

        store
            .update_refresh_token("test@example.com", "token-2")
            .await
            .unwrap();
        assert!(store.validate_refresh_token("token-1").await.is_err());
        assert!(store.validate_refresh_token("token-2").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_refresh_token_unknown_user() {
        let store = store();
        let err = store.update_refresh_token("999", "token").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IdentityNotFound);
    }

    #[tokio::test]
    async fn test_display_name_does_not_capture_login() {
        let store = InMemoryUserStore::new()
            .with_user(User::new(42, "alice@example.com", "alice-secret"))
            .with_user(User::new(7, "mallory@example.com", "mallory-secret").with_name("42"));

        let user = store
            .find_user_by_credentials("42", "alice-secret")
            .await
            .unwrap();
        assert_eq!(user.account_id, 42);

        let err = store
            .find_user_by_credentials("42", "mallory-secret")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);

        store.update_refresh_token("42", "alice-token").await.unwrap();
        let owner = store.validate_refresh_token("alice-token").await.unwrap();
        assert_eq!(owner.account_id, 42);
        assert!(store.get(7).unwrap().unwrap().refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_ambiguous_username_resolution() {
        let store = InMemoryUserStore::new()
            .with_user(User::new(42, "alice@example.com", "alice-secret"))
            .with_user(User::new(7, "42", "numeric-secret"));

        let user = store
            .find_user_by_credentials("42", "numeric-secret")
            .await
            .unwrap();
        assert_eq!(user.account_id, 7);

        // 更新 refresh token 时账户 ID 优先
        store.update_refresh_token("42", "alice-token").await.unwrap();
        let owner = store.validate_refresh_token("alice-token").await.unwrap();
        assert_eq!(owner.account_id, 42);
        assert!(store.get(7).unwrap().unwrap().refresh_token.is_none());
    }

    #[test]
    fn test_insert_and_len() {
        let store = InMemoryUserStore::new();
        assert!(store.is_empty().unwrap());

        store.insert(User::new(1, "a@example.com", "s")).unwrap();
        store.insert(User::new(2, "b@example.com", "s")).unwrap();
        store.insert(User::new(1, "c@example.com", "s")).unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.get(1).unwrap().unwrap().mail, "c@example.com");
        assert!(store.get(3).unwrap().is_none());
    }
}
