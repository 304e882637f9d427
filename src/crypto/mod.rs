//! 密码学工具模块
//!
//! 提供存储实现比较秘密值时使用的常量时间比较函数。

use subtle::ConstantTimeEq;

/// 常量时间比较两个字节切片
///
/// 用于防止时序攻击。长度不同的输入直接返回 false。
///
/// # Example
///
/// ```rust
/// use responsible_auth::crypto::constant_time_compare;
///
/// assert!(constant_time_compare(b"secret_token", b"secret_token"));
/// assert!(!constant_time_compare(b"secret_token", b"other_token!"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// 常量时间比较两个字符串
pub fn constant_time_compare_str(a: &str, b: &str) -> bool {
    constant_time_compare(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"hello", b"hello"));
        assert!(!constant_time_compare(b"hello", b"world"));
        assert!(!constant_time_compare(b"hello", b"hell"));
    }

    #[test]
    fn test_constant_time_compare_str() {
        assert!(constant_time_compare_str("secret", "secret"));
        assert!(!constant_time_compare_str("secret", "Secret"));
        assert!(!constant_time_compare_str("", "secret"));
    }
}
