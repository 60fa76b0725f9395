//! Permission evaluation subsystem.
//!
//! # Data Flow
//! ```text
//! evaluate(doc_type, doc_id, spec)
//!     → documents.rs (read-through fetch from the external store)
//!     → named field parsed against the ladder
//!     → explicit level, or the spec's restrictive default
//! ```
//!
//! # Design Decisions
//! - Missing document = operator error (500), never "denied"
//! - Missing/unparseable field = restrictive default, never "allow all"
//! - Generic over the ladder type; one algorithm, many ladders

pub mod documents;
pub mod evaluator;
pub mod level;

pub use documents::{ConfigDocumentSource, HttpDocumentStore};
pub use evaluator::{evaluate, EvaluatorSpec, PermissionEvaluator};
pub use level::{PermLevel, PermissionLevel};
