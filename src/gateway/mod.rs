//! Security gateway subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → middleware.rs (two-branch dispatch)
//!         admin namespace → direct-peer loopback check only
//!         otherwise       → trust resolution → token / credential auth
//!     → Principal + PermissionEvaluator attached to request extensions
//!     → forwarded downstream; response stamped with a renewed token
//! ```
//!
//! # Design Decisions
//! - Fail closed: every resolver or authenticator failure is terminal
//! - Principal is an immutable value, built once per request
//! - Per-action permission checks belong to downstream handlers; the
//!   gateway's job ends at making identity, roles, and the evaluator
//!   available

pub mod middleware;
pub mod principal;
pub mod roles;

pub use middleware::{security_gateway, GatewayState};
pub use principal::Principal;
