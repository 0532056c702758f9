//! Snapshot providers: where the engine's input comes from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::SnapshotError;

use super::model::Snapshot;

/// Supplies a consistent point-in-time snapshot of onboarding data.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Acquire a fresh snapshot.
    async fn snapshot(&self) -> Result<Snapshot, SnapshotError>;
}

/// Reads a snapshot from a JSON file on every call.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SnapshotProvider for JsonFileProvider {
    async fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SnapshotError::Read {
                path: self.path.display().to_string(),
                source,
            })?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        debug!(
            path = %self.path.display(),
            employees = snapshot.employees.len(),
            records = snapshot.onboarding_records.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }
}

/// Serves a fixed in-memory snapshot (tests, embedding).
pub struct StaticProvider {
    snapshot: Snapshot,
}

impl StaticProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl SnapshotProvider for StaticProvider {
    async fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        Ok(self.snapshot.clone())
    }
}
