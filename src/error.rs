//! Error types for the onboarding view engine.

use std::time::Duration;

use crate::onboarding::{Role, Stage};

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    #[error("View error: {0}")]
    View(#[from] ViewError),

    #[error("View worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Snapshot acquisition errors.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Snapshot acquisition timed out after {0:?}")]
    Timeout(Duration),
}

/// Stage engine contract violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("Invalid stage transition for {employee_id}: {from} -> {to}")]
    InvalidTransition {
        employee_id: String,
        from: Stage,
        to: Stage,
    },

    #[error("Onboarding record for {employee_id} has an empty stage history")]
    EmptyHistory { employee_id: String },

    #[error("Progress {value}% is out of range for {employee_id}")]
    ProgressOutOfRange { employee_id: String, value: u8 },

    #[error("Progress for {employee_id} cannot drop from {current}% to {requested}% within a stage")]
    ProgressRegression {
        employee_id: String,
        current: u8,
        requested: u8,
    },
}

/// Role view contract violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Requester {id} not found in snapshot")]
    UnknownRequester { id: String },

    #[error("Requester {id} holds role {role} and cannot open the {requested} view")]
    RoleMismatch { id: String, role: Role, requested: Role },

    #[error("No onboarding record for employee {employee_id}")]
    MissingRecord { employee_id: String },

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
