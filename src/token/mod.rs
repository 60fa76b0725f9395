//! Stateless token subsystem.
//!
//! # Data Flow
//! ```text
//! issue:    username → "user|now_millis" → cipher.rs seal → header value
//! validate: header value → cipher.rs open → split → age check → username
//! ```
//!
//! # Design Decisions
//! - Validity is content + shared seed only; no session table anywhere
//! - Decryption failure is a routine outcome, logged at debug level
//! - Max age comes from a compact literal ("20m") parsed once at startup

pub mod authenticator;
pub mod cipher;
pub mod max_age;

pub use authenticator::TokenAuthenticator;
pub use cipher::TokenCipher;
