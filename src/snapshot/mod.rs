//! Snapshot input: the immutable data a view is computed from.

pub mod model;
pub mod provider;

pub use model::{Enrollment, Snapshot, SnapshotIndex};
pub use provider::{JsonFileProvider, SnapshotProvider, StaticProvider};
