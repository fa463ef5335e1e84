//! 认证模块
//!
//! 提供 JWT Token 生成、验证和密码处理功能

mod jwt;
mod password;

pub use jwt::{Claims, JwtConfig, JwtManager};
pub use password::{hash_password, verify_password};

use uuid::Uuid;

use crate::error::{ForumError, Result};

/// 当前登录用户
///
/// 由认证中间件在校验 Token 并确认用户仍存在后注入请求扩展
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl CurrentUser {
    /// 请求体中携带的操作人 id 必须是当前用户本人
    pub fn ensure_is(&self, user_id: Uuid) -> Result<()> {
        if self.id == user_id {
            Ok(())
        } else {
            Err(ForumError::Forbidden("不能代替其他用户操作".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_is() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
        };
        assert!(user.ensure_is(user.id).is_ok());
        assert!(matches!(
            user.ensure_is(Uuid::new_v4()),
            Err(ForumError::Forbidden(_))
        ));
    }
}
