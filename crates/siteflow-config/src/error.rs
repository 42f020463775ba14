//! Configuration error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Domain {domain} is not covered by base domain {base_domain}")]
    DomainMismatch { domain: String, base_domain: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
