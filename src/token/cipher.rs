//! Symmetric token cipher.
//!
//! Tokens are sealed with ChaCha20-Poly1305 under a key derived from the
//! configured seed (SHA-256). The random nonce is prepended to the
//! ciphertext and the whole value is base64url-encoded so it survives HTTP
//! header transport. The AEAD tag means any tampering fails decryption
//! rather than producing garbage cleartext.
//!
//! With encryption disabled the token is base64url of the cleartext; that
//! mode exists for local debugging only.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use sha2::{Digest, Sha256};

use crate::error::GatewayError;

const NONCE_LEN: usize = 12;

/// Seed-keyed cipher for sealing and opening token values.
pub struct TokenCipher {
    cipher: ChaCha20Poly1305,
    enabled: bool,
}

impl TokenCipher {
    pub fn new(seed: &str, enabled: bool) -> Self {
        let digest = Sha256::digest(seed.as_bytes());
        let key = Key::from_slice(&digest);
        Self {
            cipher: ChaCha20Poly1305::new(key),
            enabled,
        }
    }

    /// Seal a cleartext value into a header-safe string.
    pub fn seal(&self, cleartext: &str) -> Result<String, GatewayError> {
        if !self.enabled {
            return Ok(URL_SAFE_NO_PAD.encode(cleartext.as_bytes()));
        }

        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, cleartext.as_bytes())
            .map_err(|_| GatewayError::InvalidToken)?;

        let mut buf = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        buf.extend_from_slice(&nonce);
        buf.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(buf))
    }

    /// Open a sealed value. Any decoding or decryption failure is
    /// `InvalidToken`; the caller decides how loudly to log it.
    pub fn open(&self, value: &str) -> Result<String, GatewayError> {
        let raw = URL_SAFE_NO_PAD
            .decode(value.as_bytes())
            .map_err(|_| GatewayError::InvalidToken)?;

        if !self.enabled {
            return String::from_utf8(raw).map_err(|_| GatewayError::InvalidToken);
        }

        if raw.len() <= NONCE_LEN {
            return Err(GatewayError::InvalidToken);
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);

        let cleartext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| GatewayError::InvalidToken)?;

        String::from_utf8(cleartext).map_err(|_| GatewayError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let cipher = TokenCipher::new("test-seed", true);
        let sealed = cipher.seal("alice|1700000000000").unwrap();
        assert_ne!(sealed, "alice|1700000000000");
        assert_eq!(cipher.open(&sealed).unwrap(), "alice|1700000000000");
    }

    #[test]
    fn sealed_values_differ_per_call() {
        // random nonce: same cleartext, different ciphertext
        let cipher = TokenCipher::new("test-seed", true);
        let a = cipher.seal("alice|0").unwrap();
        let b = cipher.seal("alice|0").unwrap();
        assert_ne!(a, b);
        assert_eq!(cipher.open(&a).unwrap(), cipher.open(&b).unwrap());
    }

    #[test]
    fn wrong_seed_fails_to_open() {
        let sealed = TokenCipher::new("seed-a", true).seal("alice|0").unwrap();
        let err = TokenCipher::new("seed-b", true).open(&sealed).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidToken));
    }

    #[test]
    fn tampered_value_fails_to_open() {
        let cipher = TokenCipher::new("test-seed", true);
        let mut sealed = cipher.seal("alice|0").unwrap();
        sealed.replace_range(..2, "zz");
        assert!(cipher.open(&sealed).is_err());
    }

    #[test]
    fn garbage_never_panics() {
        let cipher = TokenCipher::new("test-seed", true);
        for garbage in ["", "!!!", "AAAA", "not base64 at all %%"] {
            assert!(cipher.open(garbage).is_err());
        }
    }

    #[test]
    fn disabled_mode_is_plain_base64() {
        let cipher = TokenCipher::new("ignored", false);
        let sealed = cipher.seal("alice|0").unwrap();
        assert_eq!(sealed, URL_SAFE_NO_PAD.encode(b"alice|0"));
        assert_eq!(cipher.open(&sealed).unwrap(), "alice|0");
    }
}
