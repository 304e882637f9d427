//! 统一错误类型模块
//!
//! 提供 responsible-auth 中所有操作的错误类型定义。
//!
//! 错误按来源分组（配置、凭证、存储、Token），并可通过 [`Error::kind`]
//! 归约为调用方关心的 [`ErrorKind`]。存储层错误原样向上传递，不做重试。

use thiserror::Error;

/// responsible-auth 的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// responsible-auth 的错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 凭证解码错误
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// 存储错误
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Token 相关错误
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 将错误归约为对外可见的错误种类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::ConfigInvalid,
            Error::Credential(_) => ErrorKind::CredentialDecodeFailed,
            Error::Storage(e) => match e {
                StorageError::NotFound(_) => ErrorKind::IdentityNotFound,
                StorageError::InvalidCredentials => ErrorKind::InvalidCredentials,
                StorageError::ConnectionFailed(_) | StorageError::OperationFailed(_) => {
                    ErrorKind::StorageFailure
                }
            },
            Error::Token(e) => match e {
                TokenError::Malformed(_) => ErrorKind::TokenMalformed,
                TokenError::InvalidSignature | TokenError::DisallowedAlgorithm(_) => {
                    ErrorKind::SignatureInvalid
                }
                TokenError::Expired => ErrorKind::TokenExpired,
                TokenError::NotYetValid => ErrorKind::TokenNotYetValid,
                TokenError::InvalidRefreshToken(_) => ErrorKind::RefreshTokenInvalid,
                TokenError::EncodingFailed(_) => ErrorKind::Internal,
            },
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// 对外可见的错误种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 密钥缺失或仍为占位值
    ConfigInvalid,
    /// 凭证无法解码（base64 无效、缺少分隔符、空字段）
    CredentialDecodeFailed,
    /// 存储中找不到身份
    IdentityNotFound,
    /// 身份存在但凭证不匹配
    InvalidCredentials,
    /// Token 结构无效
    TokenMalformed,
    /// 签名错误或算法不被允许
    SignatureInvalid,
    /// Token 已过期
    TokenExpired,
    /// Token 尚未生效
    TokenNotYetValid,
    /// Refresh Token 无效
    RefreshTokenInvalid,
    /// 存储后端故障
    StorageFailure,
    /// 内部错误
    Internal,
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 未配置签名密钥
    #[error("secret key is required")]
    MissingSecret,
    /// 签名密钥仍为占位值
    #[error("secret key is still the placeholder value")]
    PlaceholderSecret,
    /// 无效的配置值
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// 凭证解码相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// base64 编码无效或内容不是 UTF-8
    #[error("invalid base64 encoding")]
    InvalidEncoding,
    /// 缺少 `:` 分隔符
    #[error("invalid credentials format: missing separator")]
    MissingSeparator,
    /// 用户名为空
    #[error("invalid credentials format: empty username")]
    EmptyUsername,
    /// 密码为空
    #[error("invalid credentials format: empty secret")]
    EmptySecret,
    /// API Key 为空
    #[error("api key is empty")]
    EmptyApiKey,
}

/// 存储相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// 记录未找到
    #[error("not found: {0}")]
    NotFound(String),
    /// 凭证不匹配
    #[error("invalid credentials")]
    InvalidCredentials,
    /// 连接失败
    #[error("storage connection failed: {0}")]
    ConnectionFailed(String),
    /// 操作失败
    #[error("storage operation failed: {0}")]
    OperationFailed(String),
}

/// Token 相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token 格式无效
    #[error("malformed token: {0}")]
    Malformed(String),
    /// Token 签名无效
    #[error("invalid token signature")]
    InvalidSignature,
    /// 头部声明了非 HMAC 算法
    #[error("signing algorithm '{0}' is not allowed")]
    DisallowedAlgorithm(String),
    /// Token 已过期
    #[error("token has expired")]
    Expired,
    /// Token 尚未生效
    #[error("token is not valid yet")]
    NotYetValid,
    /// Refresh Token 无效
    #[error("invalid refresh token: {0}")]
    InvalidRefreshToken(String),
    /// Token 编码失败
    #[error("token encoding failed: {0}")]
    EncodingFailed(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

        match err.kind() {
            JwtErrorKind::InvalidSignature
            | JwtErrorKind::InvalidAlgorithm
            | JwtErrorKind::InvalidKeyFormat => TokenError::InvalidSignature,
            JwtErrorKind::InvalidAlgorithmName => TokenError::DisallowedAlgorithm(err.to_string()),
            JwtErrorKind::ExpiredSignature => TokenError::Expired,
            JwtErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Token(TokenError::Expired);
        assert_eq!(err.to_string(), "Token error: token has expired");
    }

    #[test]
    fn test_storage_error_passthrough() {
        let err: Error = StorageError::ConnectionFailed("database connection failed".into()).into();
        assert_eq!(
            err.to_string(),
            "Storage error: storage connection failed: database connection failed"
        );
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::from(ConfigError::MissingSecret).kind(),
            ErrorKind::ConfigInvalid
        );
        assert_eq!(
            Error::from(ConfigError::PlaceholderSecret).kind(),
            ErrorKind::ConfigInvalid
        );
        assert_eq!(
            Error::from(CredentialError::MissingSeparator).kind(),
            ErrorKind::CredentialDecodeFailed
        );
        assert_eq!(
            Error::from(StorageError::NotFound("user".into())).kind(),
            ErrorKind::IdentityNotFound
        );
        assert_eq!(
            Error::from(StorageError::InvalidCredentials).kind(),
            ErrorKind::InvalidCredentials
        );
        assert_eq!(
            Error::from(TokenError::DisallowedAlgorithm("none".into())).kind(),
            ErrorKind::SignatureInvalid
        );
        assert_eq!(
            Error::from(TokenError::InvalidRefreshToken("bad".into())).kind(),
            ErrorKind::RefreshTokenInvalid
        );
    }
}
