//! Per-request identity record.

/// Immutable identity value produced once per request and passed down the
/// pipeline via request extensions. Never persisted; the raw password is
/// checked inside the authenticator and does not travel here.
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<String>,
    /// Token the request authenticated with (a fresh one is stamped on
    /// the response separately).
    pub token: String,
}

impl Principal {
    pub fn new(username: String, roles: Vec<String>, token: String) -> Self {
        Self {
            username,
            roles,
            token,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_membership() {
        let p = Principal::new(
            "alice".to_string(),
            vec!["reader".to_string(), "ops".to_string()],
            "token".to_string(),
        );
        assert!(p.has_role("reader"));
        assert!(!p.has_role("admin"));
    }
}
