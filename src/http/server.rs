//! HTTP server setup and upstream forwarding.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (tracing, timeout, security gateway)
//! - Bind server to listener
//! - Forward authenticated requests to the upstream data service

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{HeaderName, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::credentials::{CredentialStore, HttpSqlConnector};
use crate::error::GatewayError;
use crate::gateway::{security_gateway, GatewayState};
use crate::permission::{EvaluatorSpec, HttpDocumentStore, PermLevel, PermissionEvaluator};
use crate::token::TokenAuthenticator;
use crate::trust::TrustPolicy;

/// State injected into the forwarding handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: String,
}

/// HTTP server embedding the security gateway.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    /// Build all subsystems from validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let authenticator = Arc::new(TokenAuthenticator::from_config(&config.token)?);

        let token_header = HeaderName::from_bytes(config.token.header_name.as_bytes())
            .map_err(|e| GatewayError::MalformedConfiguration(e.to_string()))?;

        let policy = Arc::new(TrustPolicy::from_config(&config.forwarded));

        let credentials = Arc::new(CredentialStore::new(Box::new(HttpSqlConnector::new(
            config.credential_store.clone(),
        ))));

        let default_level = config
            .permission
            .default_level
            .parse::<PermLevel>()
            .map_err(|e| GatewayError::MalformedConfiguration(e.to_string()))?;
        let documents = HttpDocumentStore::from_config(&config.permission)?;
        let evaluator = PermissionEvaluator::new(
            Arc::new(documents),
            EvaluatorSpec {
                field_name: config.permission.permission_field.clone(),
                default_level,
            },
        );

        let gateway_state = GatewayState {
            policy,
            authenticator,
            credentials,
            evaluator,
            token_header,
            security_index: config.permission.security_index.clone(),
            ssl_user_attribute: config.ssl_user_attribute.clone(),
        };

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let app_state = AppState {
            client,
            upstream: config.upstream.address.clone(),
        };

        let router = Self::build_router(&config, app_state, gateway_state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &GatewayConfig,
        app_state: AppState,
        gateway_state: GatewayState,
    ) -> Router {
        Router::new()
            .route("/{*path}", any(forward_handler))
            .route("/", any(forward_handler))
            .with_state(app_state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(axum::middleware::from_fn_with_state(
                        gateway_state,
                        security_gateway,
                    )),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "gateway server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("gateway server stopped");
        Ok(())
    }
}

/// Forward an authenticated request to the upstream data service.
async fn forward_handler(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let mut parts = request.uri().clone().into_parts();
    parts.scheme = Some(Scheme::HTTP);
    parts.authority = match Authority::from_str(&state.upstream) {
        Ok(authority) => Some(authority),
        Err(e) => {
            tracing::error!(upstream = %state.upstream, error = %e, "invalid upstream authority");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }

    match Uri::from_parts(parts) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => {
            tracing::error!(error = %e, "unable to rewrite request uri");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    }

    match state.client.request(request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %state.upstream, error = %e, "upstream request failed");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
