//! 集成测试：API Key Provider
//!
//! 测试 API Key 解析身份、签发 token 以及 refresh token 的保存与续期。

use std::sync::Arc;

use responsible_auth::{
    ApiKeyAuthProvider, Auth, AuthOptions, AuthProvider, ErrorKind, InMemoryUserStore, User,
    UserStore,
};

const TEST_SECRET: &str = "test-secret-key-32-characters!";

fn store() -> Arc<dyn UserStore> {
    Arc::new(
        InMemoryUserStore::new()
            .with_user(
                User::new(1, "alice@example.com", "alice-secret")
                    .with_name("alice")
                    .with_api_key("sk_alice"),
            )
            .with_user(User::new(2, "", "bob-secret").with_api_key("sk_bob")),
    )
}

/// 测试 API Key 解码返回身份的登录名
#[tokio::test]
async fn test_api_key_decode() {
    let provider = ApiKeyAuthProvider::new(store(), AuthOptions::new(TEST_SECRET));

    let alice = provider.decode("sk_alice").await.unwrap();
    assert_eq!(alice.username, "alice@example.com");
    assert_eq!(alice.secret, "sk_alice");

    // 没有邮箱时使用账户 ID
    let bob = provider.decode("sk_bob").await.unwrap();
    assert_eq!(bob.username, "2");

    assert_eq!(
        provider.decode("").await.unwrap_err().kind(),
        ErrorKind::CredentialDecodeFailed
    );
    // 空白不会被裁剪
    assert_eq!(
        provider.decode("   ").await.unwrap_err().kind(),
        ErrorKind::IdentityNotFound
    );
    assert_eq!(
        provider.decode(" sk_alice").await.unwrap_err().kind(),
        ErrorKind::IdentityNotFound
    );
    assert_eq!(
        provider.decode("sk_unknown").await.unwrap_err().kind(),
        ErrorKind::IdentityNotFound
    );
}

/// 测试签发的 token 使用当前 options 中的 claims
#[tokio::test]
async fn test_api_key_issuance() {
    let options = AuthOptions::new(TEST_SECRET)
        .with_subject("service-account")
        .with_role("service")
        .with_scopes("ingest");
    let provider = ApiKeyAuthProvider::new(store(), options);

    let access = provider.create_access_token("ignored", "sk_alice").await.unwrap();
    let claims = provider.validate(access.as_str()).unwrap().into_claims();

    assert_eq!(claims.sub.as_deref(), Some("service-account"));
    assert_eq!(claims.role, "service");
    assert_eq!(claims.scopes, "ingest");
}

/// 测试 refresh token 保存到对应用户并可续期
#[tokio::test]
async fn test_api_key_refresh_flow() {
    let auth: Auth<ApiKeyAuthProvider> = Auth::new(store(), AuthOptions::new(TEST_SECRET));

    let alice_refresh = auth.create_refresh_token("", "sk_alice").await.unwrap();
    let bob_refresh = auth.create_refresh_token("", "sk_bob").await.unwrap();

    assert_eq!(alice_refresh.claims().username, "alice");
    assert_eq!(bob_refresh.claims().username, "2");

    let alice = auth
        .store()
        .validate_refresh_token(alice_refresh.as_str())
        .await
        .unwrap();
    assert_eq!(alice.account_id, 1);

    let bob = auth
        .store()
        .validate_refresh_token(bob_refresh.as_str())
        .await
        .unwrap();
    assert_eq!(bob.account_id, 2);

    let access = auth
        .exchange_refresh_token(alice_refresh.as_str())
        .await
        .unwrap();
    assert!(auth.validate(access.as_str()).is_ok());
}

/// 测试未知 API Key 不会签发 token
#[tokio::test]
async fn test_unknown_api_key_rejected() {
    let auth: Auth<ApiKeyAuthProvider> = Auth::new(store(), AuthOptions::new(TEST_SECRET));

    assert_eq!(
        auth.create_access_token("alice@example.com", "sk_wrong")
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::IdentityNotFound
    );
    assert_eq!(
        auth.create_refresh_token("alice@example.com", "")
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::IdentityNotFound
    );
    assert_eq!(
        auth.login("sk_wrong").await.unwrap_err().kind(),
        ErrorKind::IdentityNotFound
    );
}
