//! Gateway error taxonomy.
//!
//! Every failure a request can hit on its way through the gateway maps to
//! exactly one variant, and every variant maps to exactly one response
//! status. Trust failures are 403, authentication failures are 401, and
//! anything pointing at broken configuration is 500. Client-visible bodies
//! are fixed per status; variant detail stays in the server-side logs.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request arrived with no usable peer address.
    #[error("request source could not be established")]
    UntrustedSource,

    /// The forwarding header is required by policy but absent.
    #[error("required forwarding header is missing")]
    MissingForwardHeader,

    /// A forwarding header was presented but no proxies are trusted.
    #[error("a forwarding header was presented but no trusted proxies are configured")]
    NoTrustedProxiesConfigured,

    /// The proxy chain contains an untrusted hop, or the peer itself is
    /// neither trusted nor loopback.
    #[error("forwarding chain contains an untrusted hop")]
    UntrustedProxyChain,

    /// An address literal failed to parse.
    #[error("invalid address literal: {0:?}")]
    InvalidAddress(String),

    /// The token failed to decrypt, decode, or parse.
    #[error("token is invalid")]
    InvalidToken,

    /// The token decoded cleanly but is past its maximum age.
    #[error("token has expired")]
    ExpiredToken,

    /// Presented credentials do not match the stored ones.
    #[error("credentials do not match")]
    CredentialMismatch,

    /// The credential store stayed unreachable across the retry.
    #[error("credential store unavailable: {0}")]
    CredentialStoreUnavailable(String),

    /// Configuration that validation should have rejected, or a stored
    /// document that is structurally unusable.
    #[error("malformed configuration: {0}")]
    MalformedConfiguration(String),
}

impl GatewayError {
    /// Response status this error terminates the request with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UntrustedSource
            | Self::MissingForwardHeader
            | Self::NoTrustedProxiesConfigured
            | Self::UntrustedProxyChain => StatusCode::FORBIDDEN,

            Self::InvalidToken
            | Self::ExpiredToken
            | Self::CredentialMismatch
            | Self::CredentialStoreUnavailable(_) => StatusCode::UNAUTHORIZED,

            Self::InvalidAddress(_) | Self::MalformedConfiguration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Fixed response body. Deliberately carries no variant detail; the
    /// client learns the status class and nothing else.
    pub fn client_message(&self) -> &'static str {
        match self.status() {
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            _ => "Internal server error",
        }
    }
}
