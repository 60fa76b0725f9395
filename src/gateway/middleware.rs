//! Security gateway orchestration.
//!
//! Runs ahead of the forwarding handler for every inbound request. Two
//! dispatch branches:
//!
//! 1. Requests addressing the security-configuration namespace: resolved
//!    against the literal socket peer only (forwarding headers are never
//!    honored here) and allowed solely from loopback.
//! 2. Everything else: trust resolution per the configured proxy policy,
//!    then token validation with a one-time credential fallback, then the
//!    request carries an immutable `Principal` and a permission evaluator
//!    handle downstream. Authenticated responses get a renewed token.
//!
//! Every rejection is terminal and carries a fixed, non-sensitive body;
//! diagnostic detail stays in the server-side logs.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderName, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use uuid::Uuid;

use crate::credentials::CredentialStore;
use crate::error::GatewayError;
use crate::gateway::principal::Principal;
use crate::gateway::roles::normalize_remote_user;
use crate::observability::metrics;
use crate::permission::PermissionEvaluator;
use crate::token::TokenAuthenticator;
use crate::trust::{resolve_client_address, resolve_direct_peer, TrustPolicy};

/// State shared by every gateway evaluation. Everything here is read-only
/// after startup except the credential store, which serializes its own
/// connection handling internally.
#[derive(Clone)]
pub struct GatewayState {
    pub policy: Arc<TrustPolicy>,
    pub authenticator: Arc<TokenAuthenticator>,
    pub credentials: Arc<CredentialStore>,
    pub evaluator: PermissionEvaluator,
    pub token_header: HeaderName,
    pub security_index: String,
    pub ssl_user_attribute: Option<String>,
}

/// Middleware entry point.
pub async fn security_gateway(
    State(state): State<GatewayState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4();
    let peer_ip = peer.ip().to_string();

    // Branch 1: administrative access to the security configuration
    // namespace. Direct peer only, loopback only, no exceptions.
    if targets_index(request.uri().path(), &state.security_index) {
        return match resolve_direct_peer(&peer_ip) {
            Ok(addr) if addr.is_loopback() => {
                tracing::debug!(%request_id, peer = %peer_ip, "security index access from loopback");
                metrics::record_outcome("admin_forwarded");
                next.run(request).await
            }
            Ok(addr) => {
                tracing::warn!(%request_id, peer = %addr, "security index access from non-loopback peer");
                metrics::record_outcome("forbidden");
                (
                    StatusCode::FORBIDDEN,
                    "Only allowed from localhost (loopback)",
                )
                    .into_response()
            }
            Err(e) => {
                tracing::error!(%request_id, error = %e, "peer resolution failed on admin path");
                metrics::record_outcome("error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        };
    }

    // Branch 2: normal resource access. Trust resolution first.
    let forwarded_value = forwarded_header_value(&request, &state.policy);
    let client_addr =
        match resolve_client_address(&peer_ip, forwarded_value.as_deref(), &state.policy) {
            Ok(addr) => addr,
            Err(e) => {
                tracing::warn!(%request_id, peer = %peer_ip, error = %e, "trust resolution failed");
                metrics::record_outcome(outcome_label(&e));
                return (e.status(), e.client_message()).into_response();
            }
        };

    tracing::debug!(%request_id, client = %client_addr, "client address resolved");

    // Owned copies so no request borrow is held across the lookups.
    let token_value = request
        .headers()
        .get(&state.token_header)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let credentials = basic_credentials(&request);

    let principal = match authenticate(&state, token_value, credentials).await {
        Ok(principal) => principal,
        Err(e) => {
            tracing::debug!(%request_id, client = %client_addr, error = %e, "authentication failed");
            metrics::record_outcome(outcome_label(&e));
            return rejection_response(&request, &e);
        }
    };

    tracing::debug!(
        %request_id,
        username = %principal.username,
        roles = principal.roles.len(),
        "request authenticated"
    );

    let username = principal.username.clone();
    request.extensions_mut().insert(principal);
    request.extensions_mut().insert(state.evaluator.clone());

    let mut response = next.run(request).await;

    // Sliding expiry: every authenticated response carries a fresh token.
    let renewed = match state
        .authenticator
        .issue(&username)
        .map_err(|e| e.to_string())
        .and_then(|t| HeaderValue::from_str(&t).map_err(|e| e.to_string()))
    {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(%request_id, error = %e, "unable to issue renewal token");
            metrics::record_outcome("error");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };
    response.headers_mut().insert(state.token_header.clone(), renewed);

    metrics::record_outcome("forwarded");
    response
}

/// Token validation with one-time credential fallback.
async fn authenticate(
    state: &GatewayState,
    token_value: Option<String>,
    credentials: Option<(String, String)>,
) -> Result<Principal, GatewayError> {
    if let Some(value) = token_value {
        if let Some(remote_user) = state.authenticator.validate(&value) {
            let username =
                normalize_remote_user(&remote_user, state.ssl_user_attribute.as_deref());
            let roles = state.credentials.lookup_roles(&username).await?;
            return Ok(Principal::new(username, roles, value));
        }
        // Invalid or expired token: fall through to the credential check,
        // the client may be re-authenticating.
    }

    let Some((username, password)) = credentials else {
        return Err(GatewayError::InvalidToken);
    };

    let stored = state.credentials.lookup_password(&username).await?;
    match stored {
        Some(stored) if !stored.is_empty() && stored == password.trim() => {
            let username = normalize_remote_user(&username, state.ssl_user_attribute.as_deref());
            let roles = state.credentials.lookup_roles(&username).await?;
            let token = state.authenticator.issue(&username)?;
            Ok(Principal::new(username, roles, token))
        }
        _ => Err(GatewayError::CredentialMismatch),
    }
}

/// Does the request address the given storage namespace?
///
/// The path is percent-decoded before matching so an encoded spelling of
/// the namespace cannot slip past the check and be decoded by the
/// upstream. The first decoded segment may name several namespaces,
/// comma-separated.
fn targets_index(path: &str, index: &str) -> bool {
    let decoded = urlencoding::decode_binary(path.as_bytes());
    let decoded = String::from_utf8_lossy(&decoded);
    let first = decoded
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or("");
    first.split(',').any(|segment| segment == index)
}

fn forwarded_header_value(request: &Request<Body>, policy: &TrustPolicy) -> Option<String> {
    let name = policy.forwarded_header.as_deref()?;
    let value = request.headers().get(name)?.to_str().ok()?.to_string();
    tracing::debug!(header = name, value = %value, "forwarding header present");
    Some(value)
}

/// Extract a username/password pair from HTTP Basic credentials.
fn basic_credentials(request: &Request<Body>) -> Option<(String, String)> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.as_bytes()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    if username.is_empty() || password.is_empty() {
        return None;
    }
    Some((username.to_string(), password.to_string()))
}

/// Rejection with the keep-alive behavior clients expect on 401: the
/// connection stays open unless the caller asked to close it.
fn rejection_response(request: &Request<Body>, err: &GatewayError) -> Response {
    let close_requested = request
        .headers()
        .get(header::CONNECTION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("close"))
        .unwrap_or(false);

    let mut response = (err.status(), err.client_message()).into_response();
    let connection = if close_requested { "close" } else { "keep-alive" };
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static(connection));
    response
}

fn outcome_label(err: &GatewayError) -> &'static str {
    match err.status() {
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        _ => "error",
    }
}
