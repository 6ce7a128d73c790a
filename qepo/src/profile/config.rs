use std::{env, sync::LazyLock};

/// Bucket that holds profile pictures
pub(crate) static AVATAR_BUCKET: LazyLock<String> =
    LazyLock::new(|| env::var("AVATAR_BUCKET").unwrap_or_else(|_| "avatar".to_string()));

/// Largest accepted profile picture, in bytes
pub static AVATAR_MAX_BYTES: LazyLock<usize> = LazyLock::new(|| {
    env::var("AVATAR_MAX_BYTES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(2 * 1024 * 1024)
});

pub(crate) const AVATAR_CONTENT_TYPE: &str = "image/png";

pub(crate) fn avatar_key(user_id: &str) -> String {
    format!("avatar-{user_id}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_key() {
        assert_eq!(avatar_key("abc-123"), "avatar-abc-123.png");
    }
}
