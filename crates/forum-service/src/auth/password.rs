//! 密码处理
//!
//! 提供密码哈希和验证功能

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::error::ForumError;

/// 使用 bcrypt 生成密码哈希
pub fn hash_password(password: &str) -> Result<String, ForumError> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// 比较明文密码与存储的哈希值
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ForumError> {
    verify(password, hash).map_err(|e| ForumError::Internal(format!("密码验证失败: {}", e)))
}
