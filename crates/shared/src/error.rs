//! Error types for rolecheck

use thiserror::Error;

/// Error thrown when a role name is defined twice
#[derive(Debug, Error)]
#[error("Role '{role}' already exists")]
pub struct DuplicateRoleError {
    pub role: String,
}

/// Error thrown when a role source references an undefined role (strict mode only)
#[derive(Debug, Error)]
#[error("Role '{role}' not found. Available roles: {}", available_roles.join(", "))]
pub struct UnknownRoleError {
    pub role: String,
    pub available_roles: Vec<String>,
}

/// General rolecheck error type
#[derive(Debug, Error)]
pub enum RbacError {
    #[error(transparent)]
    DuplicateRole(#[from] DuplicateRoleError),

    #[error(transparent)]
    UnknownRole(#[from] UnknownRoleError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry lock poisoned: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, RbacError>;
