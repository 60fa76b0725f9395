//! Credential store subsystem.
//!
//! # Data Flow
//! ```text
//! lookup(username)
//!     → store.rs (serialized connection slot, bounded retry)
//!     → connector.rs (parameterized statement over the bridge)
//!     → trimmed password / role names
//! ```
//!
//! # Design Decisions
//! - One live connection, guarded by a single async mutex
//! - Exactly one retry with a fresh connection, then fail closed
//! - Usernames are bind parameters, never statement text

pub mod connector;
pub mod store;

pub use connector::{CredentialConnection, CredentialConnector, HttpSqlConnector};
pub use store::CredentialStore;
