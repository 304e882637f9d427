//! 认证入口模块
//!
//! [`Auth`] 绑定一个 Provider（Provider 自身持有存储和配置），
//! 对外提供完整的登录与续期流程。
//!
//! ## 示例
//!
//! ```rust
//! use std::sync::Arc;
//! use responsible_auth::{Auth, AuthOptions, BasicAuthProvider, InMemoryUserStore, User};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(
//!     InMemoryUserStore::new().with_user(User::new(1, "test@example.com", "pass")),
//! );
//! let auth: Auth<BasicAuthProvider> =
//!     Auth::new(store, AuthOptions::new("my-secret-key-at-least-32-bytes!"));
//!
//! let response = auth.login("dGVzdEBleGFtcGxlLmNvbTpwYXNz").await.unwrap();
//! assert_eq!(response.token_type, "Bearer");
//!
//! let renewed = auth.exchange_refresh_token(&response.refresh_token).await.unwrap();
//! assert!(auth.validate(renewed.as_str()).is_ok());
//! # });
//! ```

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::options::AuthOptions;
use crate::provider::{AuthProvider, Credentials};
use crate::store::UserStore;
use crate::token::{Claims, RefreshClaims, Token, TokenResponse};

/// 认证入口
#[derive(Clone)]
pub struct Auth<P: AuthProvider> {
    provider: P,
}

impl<P: AuthProvider> Auth<P> {
    /// 使用存储与配置构造 Provider 并绑定
    pub fn new(store: Arc<dyn UserStore>, options: AuthOptions) -> Self {
        Self {
            provider: P::new(store, options),
        }
    }

    /// 绑定已构造的 Provider
    pub fn from_provider(provider: P) -> Self {
        Self { provider }
    }

    /// 当前 Provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// 取出 Provider
    pub fn into_provider(self) -> P {
        self.provider
    }

    /// 当前配置
    pub fn options(&self) -> &AuthOptions {
        self.provider.options()
    }

    /// 当前存储
    pub fn store(&self) -> &Arc<dyn UserStore> {
        self.provider.store()
    }

    /// 解码凭证
    pub async fn decode(&self, credential: &str) -> Result<Credentials> {
        self.provider.decode(credential).await
    }

    /// 签发 Access Token
    pub async fn create_access_token(&self, user_id: &str, secret: &str) -> Result<Token<Claims>> {
        self.provider.create_access_token(user_id, secret).await
    }

    /// 签发 Refresh Token
    pub async fn create_refresh_token(
        &self,
        user_id: &str,
        secret: &str,
    ) -> Result<Token<RefreshClaims>> {
        self.provider.create_refresh_token(user_id, secret).await
    }

    /// 无状态地使用 Refresh Token 换取 Access Token
    pub fn grant_refresh_token(&self, refresh_token: &str) -> Result<Token<Claims>> {
        self.provider.grant_refresh_token(refresh_token)
    }

    /// 验证 Access Token
    pub fn validate(&self, token: &str) -> Result<Token<Claims>> {
        self.provider.validate(token)
    }

    /// 完整登录流程：解码凭证，签发 access 与 refresh token
    pub async fn login(&self, credential: &str) -> Result<TokenResponse> {
        let credentials = self.provider.decode(credential).await?;

        let access = self
            .provider
            .create_access_token(&credentials.username, &credentials.secret)
            .await?;
        let refresh = self
            .provider
            .create_refresh_token(&credentials.username, &credentials.secret)
            .await?;

        debug!(scheme = self.provider.scheme(), "login succeeded");
        Ok(TokenResponse::new_at(&access, &refresh, Utc::now())
            .with_cookie_duration(self.options().cookie_duration))
    }

    /// 续期流程：refresh token 必须仍记录在存储中，之后执行无状态交换
    pub async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Token<Claims>> {
        let user = self
            .store()
            .validate_refresh_token(refresh_token)
            .await
            .map_err(|e| {
                warn!(error = %e, "refresh token not recognised by store");
                e
            })?;

        debug!(account_id = user.account_id, "refresh token recognised");
        self.provider.grant_refresh_token(refresh_token)
    }
}
