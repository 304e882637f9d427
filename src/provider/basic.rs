//! Basic Auth Provider
//!
//! 凭证格式为 `base64(username:password)`（标准字母表，带填充）。
//! 密码中可以包含 `:`，只按第一个 `:` 拆分。

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{AuthProvider, Credentials, refresh_username};
use crate::error::{CredentialError, Result};
use crate::options::AuthOptions;
use crate::store::UserStore;
use crate::token::{self, Claims, RefreshClaims, Token};

/// Basic Auth Provider
#[derive(Clone)]
pub struct BasicAuthProvider {
    store: Arc<dyn UserStore>,
    options: AuthOptions,
}

/// 解码 Basic Auth 凭证
pub fn decode_basic(encoded: &str) -> std::result::Result<Credentials, CredentialError> {
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| CredentialError::InvalidEncoding)?;
    let decoded = String::from_utf8(decoded).map_err(|_| CredentialError::InvalidEncoding)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(CredentialError::MissingSeparator)?;

    if username.is_empty() {
        return Err(CredentialError::EmptyUsername);
    }
    if password.is_empty() {
        return Err(CredentialError::EmptySecret);
    }

    Ok(Credentials::new(username, password))
}

#[async_trait]
impl AuthProvider for BasicAuthProvider {
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
        "basic"
    }

    fn options(&self) -> &AuthOptions {
        &self.options
    }

    fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    async fn decode(&self, credential: &str) -> Result<Credentials> {
        decode_basic(credential).map_err(|e| {
            warn!(scheme = self.scheme(), error = %e, "credential decode failed");
            e.into()
        })
    }

    async fn create_access_token(&self, user_id: &str, secret: &str) -> Result<Token<Claims>> {
        let user = self.store.find_user_by_credentials(user_id, secret).await?;
        debug!(account_id = user.account_id, "identity resolved for access token");

        token::create_access_token(&self.options)
    }

    async fn create_refresh_token(&self, user_id: &str, secret: &str) -> Result<Token<RefreshClaims>> {
        let user = self.store.find_user_by_credentials(user_id, secret).await?;

        let refresh = token::create_refresh_token(&refresh_username(&user), &self.options)?;
        self.store
            .update_refresh_token(&user.account_id.to_string(), refresh.as_str())
            .await?;

        debug!(account_id = user.account_id, "refresh token issued and stored");
        Ok(refresh)
    }

    fn grant_refresh_token(&self, refresh_token: &str) -> Result<Token<Claims>> {
        token::grant_refresh_token(refresh_token, &self.options)
    }

    fn validate(&self, token: &str) -> Result<Token<Claims>> {
        token::validate(token, &self.options)
    }
}
