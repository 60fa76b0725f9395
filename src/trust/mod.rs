//! Trust resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → socket peer address (always available)
//!     → optional forwarding header (client-controlled, untrusted)
//!     → resolver.rs applies the trusted-proxy policy
//!     → single resolved client address, or terminal denial
//! ```
//!
//! # Design Decisions
//! - Fail closed: unconfigured or ambiguous policy always denies
//! - The trusted-proxy set is immutable after startup
//! - No trust in client input

pub mod resolver;

pub use resolver::{resolve_client_address, resolve_direct_peer, TrustPolicy};
