//! HTTP server subsystem.
//!
//! # Data Flow
//! ```text
//! listener → axum router
//!     → TraceLayer (request spans)
//!     → TimeoutLayer (request deadline)
//!     → security gateway middleware
//!     → forward_handler → upstream data service
//! ```

pub mod server;

pub use server::GatewayServer;
