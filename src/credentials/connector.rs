//! Credential store connectors.
//!
//! The relational credential store is external; the gateway talks to it
//! through a `CredentialConnector`, which hands out logical connections.
//! The shipped connector speaks to an HTTP SQL bridge. Statements are
//! built once per connection from operator-supplied table and column
//! names; the username is always sent as a bind parameter, never spliced
//! into the statement text, because it originates from request input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CredentialStoreConfig;
use crate::error::GatewayError;

/// Opens logical connections to the credential store.
#[async_trait]
pub trait CredentialConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn CredentialConnection>, GatewayError>;
}

/// A live connection with its prepared statements. Dropped and replaced
/// wholesale on failure; statements never outlive their connection.
#[async_trait]
pub trait CredentialConnection: Send + Sync {
    /// Fetch the stored password for `username`, if the user exists.
    async fn fetch_password(&self, username: &str) -> Result<Option<String>, GatewayError>;

    /// Fetch the role names assigned to `username`. Empty when the
    /// deployment has no role table configured.
    async fn fetch_roles(&self, username: &str) -> Result<Vec<String>, GatewayError>;
}

#[derive(Serialize)]
struct BridgeQuery<'a> {
    statement: &'a str,
    params: Vec<&'a str>,
}

#[derive(Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

/// Connector for an HTTP SQL bridge in front of the relational store.
pub struct HttpSqlConnector {
    config: CredentialStoreConfig,
}

impl HttpSqlConnector {
    pub fn new(config: CredentialStoreConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CredentialConnector for HttpSqlConnector {
    async fn connect(&self) -> Result<Box<dyn CredentialConnection>, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::CredentialStoreUnavailable(e.to_string()))?;

        let cfg = &self.config;
        let credential_statement = format!(
            "SELECT \"{table}\".{cred} FROM \"public\".{table} WHERE \"{table}\".{name} = $1",
            table = cfg.user_table,
            cred = cfg.password_column,
            name = cfg.username_column,
        );
        tracing::info!(statement = %credential_statement, "prepared credential lookup");

        let role_statement = match (&cfg.role_table, &cfg.role_column) {
            (Some(table), Some(role)) => Some(format!(
                "SELECT \"{table}\".{role} FROM \"public\".{table} WHERE \"{table}\".{name} = $1",
                table = table,
                role = role,
                name = cfg.username_column,
            )),
            _ => None,
        };

        Ok(Box::new(HttpSqlConnection {
            client,
            endpoint: cfg.endpoint.clone(),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            credential_statement,
            role_statement,
        }))
    }
}

struct HttpSqlConnection {
    client: reqwest::Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
    credential_statement: String,
    role_statement: Option<String>,
}

impl HttpSqlConnection {
    async fn execute(
        &self,
        statement: &str,
        param: &str,
    ) -> Result<Vec<Vec<serde_json::Value>>, GatewayError> {
        let mut request = self.client.post(&self.endpoint).json(&BridgeQuery {
            statement,
            params: vec![param],
        });

        if let Some(user) = &self.username {
            request = request.basic_auth(user, self.password.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::CredentialStoreUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GatewayError::CredentialStoreUnavailable(format!(
                "bridge answered {}",
                response.status()
            )));
        }

        let body: BridgeResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::CredentialStoreUnavailable(e.to_string()))?;

        Ok(body.rows)
    }
}

#[async_trait]
impl CredentialConnection for HttpSqlConnection {
    async fn fetch_password(&self, username: &str) -> Result<Option<String>, GatewayError> {
        let rows = self.execute(&self.credential_statement, username).await?;
        Ok(rows
            .first()
            .and_then(|row| row.first())
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    async fn fetch_roles(&self, username: &str) -> Result<Vec<String>, GatewayError> {
        let Some(statement) = &self.role_statement else {
            return Ok(Vec::new());
        };

        let rows = self.execute(statement, username).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.first())
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect())
    }
}
