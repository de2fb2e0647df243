use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Number of random bytes behind a token key; the key is their hex encoding.
const KEY_BYTES: usize = 20;

/// Opaque access token. Each user owns at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Token {
    pub key: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}

impl Token {
    pub fn new(user_id: i64) -> Self {
        Self {
            key: Self::generate_key(),
            user_id,
            created: Utc::now(),
        }
    }

    /// 40 lowercase hex characters from the OS random source.
    pub fn generate_key() -> String {
        let mut bytes = [0u8; KEY_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_are_hex_and_distinct() {
        let first = Token::generate_key();
        let second = Token::generate_key();

        assert_eq!(first.len(), 40);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(first, second);
    }
}
