//! API Key Provider
//!
//! 凭证就是 API Key 本身。解码时即通过存储解析身份，
//! 签发时以 API Key 作为密钥再次确认身份。

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{AuthProvider, Credentials, refresh_username};
use crate::error::{CredentialError, Result};
use crate::options::AuthOptions;
use crate::store::UserStore;
use crate::token::{self, Claims, RefreshClaims, Token};

/// API Key Provider
#[derive(Clone)]
pub struct ApiKeyAuthProvider {
    store: Arc<dyn UserStore>,
    options: AuthOptions,
}

#[async_trait]
impl AuthProvider for ApiKeyAuthProvider {
    fn new(store: Arc<dyn UserStore>, options: AuthOptions) -> Self {
        Self { store, options }
    }

    fn with_options(self, options: AuthOptions) -> Self {
        Self { options, ..self }
    }

    fn with_store(self, store: Arc<dyn UserStore>) -> Self {
        Self { store, ..self }
    }

    fn scheme(&self) -> &'static str {
        "api_key"
    }

    fn options(&self) -> &AuthOptions {
        &self.options
    }

    fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// 解析 API Key 对应的身份，返回 `(登录名, API Key)`
    ///
    /// API Key 按原样匹配，不做任何裁剪。
    async fn decode(&self, credential: &str) -> Result<Credentials> {
        if credential.is_empty() {
            warn!(scheme = self.scheme(), "empty api key");
            return Err(CredentialError::EmptyApiKey.into());
        }

        let user = self.store.find_user_by_api_key(credential).await.map_err(|e| {
            warn!(scheme = self.scheme(), error = %e, "api key lookup failed");
            e
        })?;

        Ok(Credentials::new(user.login_name(), credential))
    }

    /// `user_id` 仅用于日志，身份由 `secret`（API Key）确定
    async fn create_access_token(&self, user_id: &str, secret: &str) -> Result<Token<Claims>> {
        let user = self.store.find_user_by_api_key(secret).await?;
        debug!(
            account_id = user.account_id,
            requested = user_id,
            "identity resolved for access token"
        );

        token::create_access_token(&self.options)
    }

    async fn create_refresh_token(&self, user_id: &str, secret: &str) -> Result<Token<RefreshClaims>> {
        let user = self.store.find_user_by_api_key(secret).await?;

        let refresh = token::create_refresh_token(&refresh_username(&user), &self.options)?;
        self.store
            .update_refresh_token(&user.account_id.to_string(), refresh.as_str())
            .await?;

        debug!(
            account_id = user.account_id,
            requested = user_id,
            "refresh token issued and stored"
        );
        Ok(refresh)
    }

    fn grant_refresh_token(&self, refresh_token: &str) -> Result<Token<Claims>> {
        token::grant_refresh_token(refresh_token, &self.options)
    }

    fn validate(&self, token: &str) -> Result<Token<Claims>> {
        token::validate(token, &self.options)
    }
}
