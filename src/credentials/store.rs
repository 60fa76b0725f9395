//! Credential store access with a serialized connection handle.
//!
//! The store owns at most one live connection at a time. All open,
//! replace, and close operations happen under a single async mutex, so
//! concurrent requests cannot race a reconnect. A failed lookup discards
//! the broken connection (and with it the prepared statements) and retries
//! exactly once on a fresh one; after that the request is answered
//! "not authenticated", never "allow".

use tokio::sync::Mutex;

use crate::credentials::connector::{CredentialConnection, CredentialConnector};
use crate::error::GatewayError;

enum Query<'a> {
    Password(&'a str),
    Roles(&'a str),
}

enum Outcome {
    Password(Option<String>),
    Roles(Vec<String>),
}

pub struct CredentialStore {
    connector: Box<dyn CredentialConnector>,
    connection: Mutex<Option<Box<dyn CredentialConnection>>>,
}

impl CredentialStore {
    pub fn new(connector: Box<dyn CredentialConnector>) -> Self {
        Self {
            connector,
            connection: Mutex::new(None),
        }
    }

    /// Fetch the stored password for `username`, trimmed. `Ok(None)` means
    /// the user does not exist; `Err` means the store stayed unreachable
    /// across the retry.
    pub async fn lookup_password(&self, username: &str) -> Result<Option<String>, GatewayError> {
        match self.with_retry(Query::Password(username)).await? {
            Outcome::Password(password) => Ok(password.map(|p| p.trim().to_string())),
            Outcome::Roles(_) => unreachable!("password query answered with roles"),
        }
    }

    /// Fetch role names assigned to `username`.
    pub async fn lookup_roles(&self, username: &str) -> Result<Vec<String>, GatewayError> {
        match self.with_retry(Query::Roles(username)).await? {
            Outcome::Roles(roles) => Ok(roles),
            Outcome::Password(_) => unreachable!("role query answered with a password"),
        }
    }

    async fn with_retry(&self, query: Query<'_>) -> Result<Outcome, GatewayError> {
        // Single-writer discipline: the slot is locked for the whole
        // lookup, including any reconnect.
        let mut slot = self.connection.lock().await;

        let mut tries_left = 2;
        loop {
            if slot.is_none() {
                match self.connector.connect().await {
                    Ok(conn) => *slot = Some(conn),
                    Err(e) => {
                        tries_left -= 1;
                        if tries_left == 0 {
                            tracing::error!(error = %e, "credential store unreachable");
                            return Err(e);
                        }
                        continue;
                    }
                }
            }

            let conn = slot.as_deref().expect("connection slot filled above");
            let result = match query {
                Query::Password(username) => {
                    conn.fetch_password(username).await.map(Outcome::Password)
                }
                Query::Roles(username) => conn.fetch_roles(username).await.map(Outcome::Roles),
            };

            match result {
                Ok(outcome) => return Ok(outcome),
                Err(e @ GatewayError::CredentialStoreUnavailable(_)) => {
                    // Broken handle: discard before any replacement.
                    *slot = None;
                    tries_left -= 1;
                    if tries_left == 0 {
                        tracing::error!(error = %e, "credential lookup failed after retry");
                        return Err(e);
                    }
                    tracing::warn!(error = %e, "credential lookup failed, retrying with fresh connection");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
