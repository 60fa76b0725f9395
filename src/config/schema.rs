//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the authentication gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream data service the gateway sits in front of.
    pub upstream: UpstreamConfig,

    /// Forwarding-header trust policy.
    pub forwarded: ForwardedConfig,

    /// Stateless token settings.
    pub token: TokenConfig,

    /// Credential store connection parameters.
    pub credential_store: CredentialStoreConfig,

    /// Permission configuration store settings.
    pub permission: PermissionConfig,

    /// Subject attribute key used to extract the username from
    /// certificate-style identities (e.g. "cn"). Unset disables extraction.
    pub ssl_user_attribute: Option<String>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream data-service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Address of the data service's HTTP entry point (e.g., "127.0.0.1:9200").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9200".to_string(),
        }
    }
}

/// Forwarding-header trust policy.
///
/// When `header` is unset the gateway never honors client-supplied
/// forwarding headers and always uses the socket peer address.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ForwardedConfig {
    /// Name of the forwarding header to honor (e.g., "X-Forwarded-For").
    pub header: Option<String>,

    /// Address literals accepted as legitimate forwarders.
    pub trusted_proxies: Vec<String>,

    /// Reject requests that do not carry the forwarding header.
    pub enforce: bool,
}

/// Stateless token settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Header carrying the token (request and response).
    pub header_name: String,

    /// Maximum token age as a compact duration literal ("20m", "2h", "1d2h30m").
    pub max_age: String,

    /// Encrypt token contents. Disabling leaves tokens base64-only and is
    /// only intended for local debugging deployments.
    pub encryption_enabled: bool,

    /// Secret seed the symmetric key is derived from.
    pub seed: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            header_name: "X-Auth-Token".to_string(),
            max_age: "20m".to_string(),
            encryption_enabled: true,
            seed: String::new(),
        }
    }
}

/// Credential store connection parameters.
///
/// The store is external; the gateway reaches it through an HTTP SQL bridge
/// and only ever issues parameterized statements built from these names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialStoreConfig {
    /// Bridge endpoint (e.g., "http://127.0.0.1:7432/query").
    pub endpoint: String,

    /// Connect username for the bridge, if it requires one.
    pub username: Option<String>,

    /// Connect password for the bridge, if it requires one.
    pub password: Option<String>,

    /// Table holding user records.
    pub user_table: String,

    /// Column holding the username.
    pub username_column: String,

    /// Column holding the password.
    pub password_column: String,

    /// Optional table holding role assignments. Roles are skipped when unset.
    pub role_table: Option<String>,

    /// Column in `role_table` holding the role name.
    pub role_column: Option<String>,

    /// Lookup timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CredentialStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: None,
            password: None,
            user_table: "users".to_string(),
            username_column: "username".to_string(),
            password_column: "password".to_string(),
            role_table: None,
            role_column: None,
            timeout_secs: 5,
        }
    }
}

/// Permission configuration store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PermissionConfig {
    /// Document store endpoint (e.g., "http://127.0.0.1:9200").
    pub document_store_endpoint: String,

    /// Storage namespace holding security configuration documents.
    /// HTTP access to this namespace is loopback-only.
    pub security_index: String,

    /// Field name read from permission documents.
    pub permission_field: String,

    /// Level applied when a rule document carries no usable field.
    pub default_level: String,

    /// Document fetch timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            document_store_endpoint: String::new(),
            security_index: "securityconfiguration".to_string(),
            permission_field: "permission".to_string(),
            default_level: "NONE".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
