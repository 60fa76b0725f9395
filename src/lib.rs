//! Authentication and authorization gateway for a clustered data service.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌────────────────────────────────────────────────┐
//!                       │                AUTH GATEWAY                     │
//!                       │                                                 │
//!   Client Request      │  ┌─────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ────────────────────┼─▶│  http   │──▶│ gateway  │──▶│  upstream    │──┼──▶ Data
//!                       │  │ server  │   │middleware│   │  forwarding  │  │    Service
//!                       │  └─────────┘   └────┬─────┘   └─────────────┘  │
//!                       │                     │                           │
//!                       │        ┌────────────┼────────────┐             │
//!                       │        ▼            ▼            ▼             │
//!                       │  ┌─────────┐  ┌──────────┐  ┌────────────┐    │
//!                       │  │  trust  │  │  token   │  │ permission  │    │
//!                       │  │resolver │  │  auth    │  │ evaluator   │    │
//!                       │  └─────────┘  └────┬─────┘  └────────────┘    │
//!                       │                    ▼                           │
//!                       │              ┌──────────┐                      │
//!                       │              │credential│                      │
//!                       │              │  store   │                      │
//!                       │              └──────────┘                      │
//!                       └────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod http;
pub mod observability;
pub mod permission;
pub mod token;
pub mod trust;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::Principal;
pub use http::GatewayServer;
