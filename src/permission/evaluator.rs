//! Generic permission evaluation.
//!
//! One lookup/parsing algorithm shared by every permission ladder. A
//! concrete instantiation supplies only the field name to read and the
//! default level, via `EvaluatorSpec` — no subclassing, no trait objects
//! per ladder.

use std::sync::Arc;

use crate::error::GatewayError;
use crate::permission::documents::ConfigDocumentSource;
use crate::permission::level::{PermLevel, PermissionLevel};

/// What a concrete evaluator instantiation needs to know.
#[derive(Debug, Clone)]
pub struct EvaluatorSpec<L> {
    /// Field read from the rule document.
    pub field_name: String,
    /// Level applied when the field is absent or unparseable. Choose the
    /// most restrictive level; a missing rule must never mean "allow".
    pub default_level: L,
}

/// Resolve the permission level named by `(doc_type, doc_id)`.
///
/// A missing document is `MalformedConfiguration` — an operator error,
/// distinct from an authorization denial. A missing or unparseable field
/// falls back to the spec's default level.
pub async fn evaluate<L: PermissionLevel>(
    source: &dyn ConfigDocumentSource,
    doc_type: &str,
    doc_id: &str,
    spec: &EvaluatorSpec<L>,
) -> Result<L, GatewayError> {
    let document = source.fetch(doc_type, doc_id).await?.ok_or_else(|| {
        GatewayError::MalformedConfiguration(format!(
            "document type {} with id {} does not exist",
            doc_type, doc_id
        ))
    })?;

    let level = match document.get(&spec.field_name).and_then(|v| v.as_str()) {
        Some(literal) => literal.parse::<L>().unwrap_or_else(|_| {
            tracing::warn!(
                doc_type,
                doc_id,
                field = %spec.field_name,
                literal,
                "unparseable permission literal, applying default level"
            );
            spec.default_level
        }),
        None => {
            tracing::warn!(
                doc_type,
                doc_id,
                field = %spec.field_name,
                "permission field absent, applying default level"
            );
            spec.default_level
        }
    };

    Ok(level)
}

/// Evaluator handle made available to downstream handlers.
///
/// The gateway attaches one of these to every authenticated request so
/// per-action checks can run against the shared document source without
/// the handlers knowing where rules are stored.
#[derive(Clone)]
pub struct PermissionEvaluator {
    source: Arc<dyn ConfigDocumentSource>,
    spec: EvaluatorSpec<PermLevel>,
}

impl PermissionEvaluator {
    pub fn new(source: Arc<dyn ConfigDocumentSource>, spec: EvaluatorSpec<PermLevel>) -> Self {
        Self { source, spec }
    }

    /// Evaluate the configured ladder for a rule document.
    pub async fn level(&self, doc_type: &str, doc_id: &str) -> Result<PermLevel, GatewayError> {
        evaluate(self.source.as_ref(), doc_type, doc_id, &self.spec).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    struct FixedSource(Option<serde_json::Value>);

    #[async_trait]
    impl ConfigDocumentSource for FixedSource {
        async fn fetch(
            &self,
            _doc_type: &str,
            _doc_id: &str,
        ) -> Result<Option<serde_json::Value>, GatewayError> {
            Ok(self.0.clone())
        }
    }

    fn spec() -> EvaluatorSpec<PermLevel> {
        EvaluatorSpec {
            field_name: "permission".to_string(),
            default_level: PermLevel::None,
        }
    }

    #[tokio::test]
    async fn explicit_level_is_returned() {
        let source = FixedSource(Some(json!({ "permission": "WRITE" })));
        let level = evaluate(&source, "actionpathfilter", "rules", &spec())
            .await
            .unwrap();
        assert_eq!(level, PermLevel::Write);
    }

    #[tokio::test]
    async fn missing_field_falls_back_to_default() {
        let source = FixedSource(Some(json!({ "comment": "no rule here" })));
        let level = evaluate(&source, "actionpathfilter", "rules", &spec())
            .await
            .unwrap();
        assert_eq!(level, PermLevel::None);
    }

    #[tokio::test]
    async fn unparseable_field_falls_back_to_default() {
        let source = FixedSource(Some(json!({ "permission": "EVERYTHING" })));
        let level = evaluate(&source, "actionpathfilter", "rules", &spec())
            .await
            .unwrap();
        assert_eq!(level, PermLevel::None);
    }

    #[tokio::test]
    async fn non_string_field_falls_back_to_default() {
        let source = FixedSource(Some(json!({ "permission": 3 })));
        let level = evaluate(&source, "actionpathfilter", "rules", &spec())
            .await
            .unwrap();
        assert_eq!(level, PermLevel::None);
    }

    #[tokio::test]
    async fn missing_document_is_malformed_configuration() {
        let source = FixedSource(None);
        let err = evaluate(&source, "actionpathfilter", "rules", &spec())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedConfiguration(_)));
    }

    #[tokio::test]
    async fn alternative_ladders_share_the_algorithm() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        enum Gate {
            Deny,
            Allow,
        }

        impl std::str::FromStr for Gate {
            type Err = ();
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    "DENY" => Ok(Gate::Deny),
                    "ALLOW" => Ok(Gate::Allow),
                    _ => Err(()),
                }
            }
        }

        let gate_spec = EvaluatorSpec {
            field_name: "gate".to_string(),
            default_level: Gate::Deny,
        };

        let source = FixedSource(Some(json!({ "gate": "ALLOW" })));
        let level = evaluate(&source, "gatefilter", "rules", &gate_spec)
            .await
            .unwrap();
        assert_eq!(level, Gate::Allow);

        let source = FixedSource(Some(json!({})));
        let level = evaluate(&source, "gatefilter", "rules", &gate_spec)
            .await
            .unwrap();
        assert_eq!(level, Gate::Deny);
    }
}
