use super::{entity_key, index_key};

/// 用户哈希键前缀
pub const USER_PREFIX: &str = "user";

/// 用户索引字段，同时是邮箱集合键前缀
pub const EMAIL_FIELD: &str = "email";

/// 生成用户信息缓存键
pub fn user_key(user_id: i64) -> String {
    entity_key(USER_PREFIX, user_id)
}

/// 生成邮箱索引集合键
pub fn email_key(email: &str) -> String {
    index_key(EMAIL_FIELD, email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_keys_follow_the_layout() {
        assert_eq!(user_key(12), "user:12");
        assert_eq!(email_key("a@b.c"), "email:a@b.c");
    }
}
