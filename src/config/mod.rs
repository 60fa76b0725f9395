//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; trust policy and token settings are
//!   process-wide and never change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::CredentialStoreConfig;
pub use schema::ForwardedConfig;
pub use schema::GatewayConfig;
pub use schema::PermissionConfig;
pub use schema::TokenConfig;
