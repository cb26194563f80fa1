use serde::{Deserialize, Serialize};

/// OAuth2 密码模式的表单，`username` 填邮箱
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: i64,
}

impl Token {
    pub fn bearer(access_token: String, expires_at: i64) -> Self {
        Self {
            access_token,
            token_type: "bearer".into(),
            expires_at,
        }
    }
}
