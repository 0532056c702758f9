//! Data anomalies: recoverable problems reported alongside normal output.

use serde::{Deserialize, Serialize};

/// What kind of problem was found in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A stage change accepted through administrative override.
    AnomalousTransition,
    /// History steps backwards without an override tag.
    UnflaggedRegression,
    /// History skips a stage without an override tag.
    UnflaggedSkip,
    /// Current stage differs from the last history entry.
    StageMismatch,
    /// History timestamps go backwards.
    HistoryOutOfOrder,
    ProgressOutOfRange,
    EmptyHistory,
    MissingDueDate,
    MalformedDueDate,
    /// Onboarding record whose employee is not in the snapshot.
    OrphanRecord,
    /// Task or evaluation referencing an employee not in the snapshot.
    UnknownEmployee,
    DuplicateRecord,
    SupervisorCycle,
}

/// A single anomaly, pointing at the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Id of the employee, task, evaluation or event involved.
    pub subject: String,
    pub detail: String,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} on {}: {}", self.kind, self.subject, self.detail)
    }
}

/// Sort and deduplicate so repeated builds report anomalies identically.
pub(crate) fn normalize(anomalies: &mut Vec<Anomaly>) {
    anomalies.sort_by(|a, b| {
        a.subject
            .cmp(&b.subject)
            .then_with(|| (a.kind as u8).cmp(&(b.kind as u8)))
            .then_with(|| a.detail.cmp(&b.detail))
    });
    anomalies.dedup();
}
