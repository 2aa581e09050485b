//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that contract addresses parse
//! - Validate value ranges (timeouts > 0, multiplier >= 1.0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DashboardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;

use crate::config::schema::DashboardConfig;

/// Largest decimals value whose scale factor still fits in a U256.
const MAX_TOKEN_DECIMALS: u8 = 77;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DashboardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let chain = &config.blockchain;
    if chain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("blockchain.rpc_url", "not a valid URL"));
    }
    for (i, failover) in chain.failover_urls.iter().enumerate() {
        if failover.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                &format!("blockchain.failover_urls[{}]", i),
                "not a valid URL",
            ));
        }
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.gas_price_multiplier < 1.0 {
        errors.push(ValidationError::new(
            "blockchain.gas_price_multiplier",
            "must be >= 1.0",
        ));
    }
    if chain.max_gas_price_gwei == 0 {
        errors.push(ValidationError::new("blockchain.max_gas_price_gwei", "must be > 0"));
    }

    let contracts = &config.contracts;
    for (field, value) in [
        ("contracts.token", &contracts.token),
        ("contracts.farm", &contracts.farm),
        ("contracts.airdrop", &contracts.airdrop),
    ] {
        if value.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                field,
                format!("'{}' is not a valid address", value),
            ));
        }
    }
    if contracts.token_decimals > MAX_TOKEN_DECIMALS {
        errors.push(ValidationError::new(
            "contracts.token_decimals",
            format!("must be <= {}", MAX_TOKEN_DECIMALS),
        ));
    }

    let flow = &config.flow;
    if flow.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new("flow.confirmation_timeout_secs", "must be > 0"));
    }
    if flow.poll_base_ms == 0 {
        errors.push(ValidationError::new("flow.poll_base_ms", "must be > 0"));
    }
    if flow.poll_max_ms < flow.poll_base_ms {
        errors.push(ValidationError::new(
            "flow.poll_max_ms",
            "must be >= flow.poll_base_ms",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
