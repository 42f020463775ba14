//! Engine error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Hosted zone not found for domain: {0}")]
    ZoneNotFound(String),

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Change set failed: {0}")]
    ChangeSetFailed(String),

    #[error("Apply failed: {0}")]
    ApplyFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Lookup context error: {0}")]
    ContextError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Template(#[from] siteflow_core::TemplateError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
