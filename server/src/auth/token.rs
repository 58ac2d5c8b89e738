//! Stateless one-time tokens for account activation and password reset.
//!
//! A token is `<issued-at, hex seconds>-<digest>`. The digest covers the
//! server secret and the user state that either flow changes (password hash,
//! last login, activation flag), so a token stops working once used.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

use crate::models::User;

const DIGEST_BYTES: usize = 16;

#[derive(Clone)]
pub struct TokenGenerator {
    secret: String,
    ttl: Duration,
}

impl TokenGenerator {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn make_token(&self, user: &User, now: DateTime<Utc>) -> String {
        let issued_at = now.timestamp();
        format!("{issued_at:x}-{}", self.digest(user, issued_at))
    }

    pub fn check_token(&self, user: &User, token: &str, now: DateTime<Utc>) -> bool {
        let Some((issued_hex, digest)) = token.split_once('-') else {
            return false;
        };
        let Ok(issued_at) = i64::from_str_radix(issued_hex, 16) else {
            return false;
        };

        let age = now.timestamp() - issued_at;
        if age < 0 || age > self.ttl.num_seconds() {
            return false;
        }

        constant_time_eq(digest.as_bytes(), self.digest(user, issued_at).as_bytes())
    }

    fn digest(&self, user: &User, issued_at: i64) -> String {
        let last_login = user
            .last_login
            .map(|at| at.timestamp_micros().to_string())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(user.id.as_bytes());
        hasher.update(user.password_hash.as_bytes());
        hasher.update(last_login.as_bytes());
        hasher.update([u8::from(user.is_active)]);
        hasher.update(issued_at.to_be_bytes());
        let digest = hasher.finalize();

        hex::encode(&digest[..DIGEST_BYTES])
    }
}
