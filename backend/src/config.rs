//! Configuration management for the hotel inventory engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with HIM_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::policy::{ApprovalPolicy, DEFAULT_VALUE_THRESHOLD};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// JWT session configuration
    pub jwt: JwtConfig,

    /// Approval policy configuration
    pub approval: ApprovalConfig,

    /// Audit configuration
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for verifying session tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApprovalConfig {
    /// Monetary value above which adjustments and write-offs need a second approver
    pub value_threshold: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditConfig {
    /// Completed audits scoring below this go to review
    pub review_score_floor: Decimal,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("HIM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("jwt.secret", "development-secret-key")?
            .set_default("approval.value_threshold", DEFAULT_VALUE_THRESHOLD.to_string())?
            .set_default("audit.review_score_floor", "80")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (HIM prefix)
            .add_source(
                Environment::with_prefix("HIM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn approval_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::new(self.approval.value_threshold)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            jwt: JwtConfig {
                secret: "development-secret-key".to_string(),
            },
            approval: ApprovalConfig {
                value_threshold: Decimal::from(DEFAULT_VALUE_THRESHOLD),
            },
            audit: AuditConfig {
                review_score_floor: Decimal::from(80),
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
