//! Stateless token issue and validation.
//!
//! A token is the encrypted string `"{username}|{issued_at_millis}"`.
//! Validity is entirely a function of the cleartext and the shared seed,
//! so no server-side session state exists and horizontal scaling needs no
//! replication. The cost is that tokens cannot be revoked before natural
//! expiry; a short max age bounds that window. Every authenticated request
//! gets a freshly issued token on the response path (sliding expiry).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::TokenConfig;
use crate::error::GatewayError;
use crate::token::cipher::TokenCipher;
use crate::token::max_age::parse_max_age;

pub struct TokenAuthenticator {
    cipher: TokenCipher,
    max_age: Duration,
    header_name: String,
}

impl TokenAuthenticator {
    pub fn new(cipher: TokenCipher, max_age: Duration, header_name: String) -> Self {
        Self {
            cipher,
            max_age,
            header_name,
        }
    }

    /// Build from validated config. Fails only if the max-age literal is
    /// unparseable, which validation should have caught earlier.
    pub fn from_config(config: &TokenConfig) -> Result<Self, GatewayError> {
        let max_age = parse_max_age(&config.max_age)
            .map_err(|e| GatewayError::MalformedConfiguration(e.to_string()))?;
        tracing::debug!(max_age_secs = max_age.as_secs(), "session max age configured");
        Ok(Self::new(
            TokenCipher::new(&config.seed, config.encryption_enabled),
            max_age,
            config.header_name.clone(),
        ))
    }

    /// Header the token travels in, both directions.
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Issue a fresh token for `username`.
    pub fn issue(&self, username: &str) -> Result<String, GatewayError> {
        self.issue_at(username, now_millis())
    }

    /// Validate a token value, returning the username when the token
    /// decrypts cleanly and is within its max age. Failures are logged at
    /// debug level only; a garbage token is routine adversarial input.
    pub fn validate(&self, value: &str) -> Option<String> {
        self.validate_at(value, now_millis())
    }

    pub(crate) fn issue_at(&self, username: &str, at_millis: u64) -> Result<String, GatewayError> {
        self.cipher.seal(&format!("{}|{}", username, at_millis))
    }

    pub(crate) fn validate_at(&self, value: &str, now_millis: u64) -> Option<String> {
        let cleartext = match self.cipher.open(value) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "unable to decrypt token header");
                return None;
            }
        };

        let (username, issued_at) = cleartext.split_once('|')?;
        let issued_at: u64 = match issued_at.parse() {
            Ok(ts) => ts,
            Err(_) => {
                tracing::debug!("token timestamp is not numeric");
                return None;
            }
        };

        let age = now_millis.saturating_sub(issued_at);
        if age <= self.max_age.as_millis() as u64 {
            Some(username.to_string())
        } else {
            tracing::debug!(username, age_millis = age, "token expired");
            None
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator(max_age: &str) -> TokenAuthenticator {
        TokenAuthenticator::new(
            TokenCipher::new("unit-test-seed", true),
            parse_max_age(max_age).unwrap(),
            "X-Auth-Token".to_string(),
        )
    }

    #[test]
    fn round_trip_immediately_returns_username() {
        let auth = authenticator("20m");
        let token = auth.issue("alice").unwrap();
        assert_eq!(auth.validate(&token).as_deref(), Some("alice"));
    }

    #[test]
    fn expiry_boundary_at_twenty_minutes() {
        let auth = authenticator("20m");
        let token = auth.issue_at("alice", 0).unwrap();

        // 19m59s old: valid
        let at = (19 * 60 + 59) * 1000;
        assert_eq!(auth.validate_at(&token, at).as_deref(), Some("alice"));

        // 20m1s old: expired
        let at = (20 * 60 + 1) * 1000;
        assert_eq!(auth.validate_at(&token, at), None);
    }

    #[test]
    fn expired_validation_has_no_side_effect() {
        let auth = authenticator("20m");
        let token = auth.issue_at("alice", 0).unwrap();
        assert_eq!(auth.validate_at(&token, u64::MAX), None);
        // the same token is still independently decodable afterwards
        assert_eq!(auth.validate_at(&token, 1000).as_deref(), Some("alice"));
    }

    #[test]
    fn tampered_and_garbage_tokens_are_invalid() {
        let auth = authenticator("20m");
        let mut token = auth.issue("alice").unwrap();
        token.push('x');
        assert_eq!(auth.validate(&token), None);
        assert_eq!(auth.validate(""), None);
        assert_eq!(auth.validate("garbage-token"), None);
    }

    #[test]
    fn token_missing_separator_is_invalid() {
        let auth = authenticator("20m");
        let sealed = TokenCipher::new("unit-test-seed", true)
            .seal("no-separator-here")
            .unwrap();
        assert_eq!(auth.validate(&sealed), None);
    }

    #[test]
    fn usernames_containing_separator_keep_first_segment() {
        // '|' is the wire separator; everything after the first one is
        // treated as the timestamp field
        let auth = authenticator("20m");
        let sealed = TokenCipher::new("unit-test-seed", true)
            .seal("alice|evil|123")
            .unwrap();
        assert_eq!(auth.validate(&sealed), None);
    }

    #[test]
    fn future_issued_tokens_are_valid() {
        // clock skew between gateway instances must not lock users out
        let auth = authenticator("20m");
        let token = auth.issue_at("alice", 60_000).unwrap();
        assert_eq!(auth.validate_at(&token, 0).as_deref(), Some("alice"));
    }
}
