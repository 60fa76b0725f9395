//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the trust policy is internally consistent
//! - Check that security-sensitive settings are actually set
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::GatewayConfig;
use crate::permission::level::PermLevel;
use crate::token::max_age::parse_max_age;

/// A single semantic validation failure.
#[derive(Debug)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.is_empty() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: "must not be empty".to_string(),
        });
    }

    if config.upstream.address.is_empty() {
        errors.push(ValidationError {
            field: "upstream.address",
            message: "must not be empty".to_string(),
        });
    }

    if config.forwarded.enforce && config.forwarded.header.is_none() {
        errors.push(ValidationError {
            field: "forwarded.enforce",
            message: "enforcement requires a forwarding header name".to_string(),
        });
    }

    if let Err(e) = parse_max_age(&config.token.max_age) {
        errors.push(ValidationError {
            field: "token.max_age",
            message: e.to_string(),
        });
    }

    if config.token.encryption_enabled && config.token.seed.is_empty() {
        errors.push(ValidationError {
            field: "token.seed",
            message: "must be set when encryption is enabled".to_string(),
        });
    }

    if config.permission.default_level.parse::<PermLevel>().is_err() {
        errors.push(ValidationError {
            field: "permission.default_level",
            message: format!("unknown permission level {:?}", config.permission.default_level),
        });
    }

    if config.credential_store.role_table.is_some() != config.credential_store.role_column.is_some()
    {
        errors.push(ValidationError {
            field: "credential_store.role_table",
            message: "role_table and role_column must be configured together".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes() {
        let mut config = GatewayConfig::default();
        config.token.seed = "secret-seed".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn enforce_without_header_is_rejected() {
        let mut config = GatewayConfig::default();
        config.token.seed = "secret-seed".to_string();
        config.forwarded.enforce = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "forwarded.enforce"));
    }

    #[test]
    fn empty_seed_with_encryption_is_rejected() {
        let config = GatewayConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "token.seed"));
    }

    #[test]
    fn multiple_errors_are_collected() {
        let mut config = GatewayConfig::default();
        config.token.max_age = "soon".to_string();
        config.permission.default_level = "MAYBE".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
