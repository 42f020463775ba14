//! Template model error types

use thiserror::Error;

/// Errors raised while assembling or validating a template
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    #[error("Invalid logical id (must be alphanumeric): {0}")]
    InvalidLogicalId(String),

    #[error("Resource {source_id} references unknown resource {target}")]
    DanglingReference { source_id: String, target: String },

    #[error("Dependency cycle involving resource {0}")]
    DependencyCycle(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
