//! Recent activity feed derived from stage history and completed items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::items::{Evaluation, Task};
use crate::snapshot::{Enrollment, SnapshotIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Joined,
    StageAdvanced,
    /// Stage change made through administrative override.
    StageOverride,
    EvaluationCompleted,
    TaskCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub at: DateTime<Utc>,
    pub kind: ActivityKind,
    pub employee_id: String,
    pub employee_name: String,
    pub details: String,
}

/// The `limit` newest activities at or before `now`, newest first.
pub fn recent_activity(
    index: &SnapshotIndex<'_>,
    enrollments: &[Enrollment<'_>],
    tasks: &[&Task],
    evaluations: &[&Evaluation],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<Activity> {
    let mut feed = Vec::new();

    for enrollment in enrollments {
        let name = enrollment.name();
        let program = enrollment
            .program()
            .map(|p| index.program(p).map_or(p.label(), |def| def.label()).to_string());

        for (i, entry) in enrollment.record.history.iter().enumerate() {
            let (kind, details) = if i == 0 {
                let details = match &program {
                    Some(label) => format!("{name} joined {label} program"),
                    None => format!("{name} started onboarding"),
                };
                (ActivityKind::Joined, details)
            } else if entry.anomalous {
                (
                    ActivityKind::StageOverride,
                    format!("{name} moved to {} stage by override", entry.stage.label()),
                )
            } else {
                (
                    ActivityKind::StageAdvanced,
                    format!("{name} advanced to {} stage", entry.stage.label()),
                )
            };
            feed.push(Activity {
                at: entry.entered_at,
                kind,
                employee_id: enrollment.employee.id.clone(),
                employee_name: name.to_string(),
                details,
            });
        }
    }

    for evaluation in evaluations {
        let Some(at) = evaluation.completed_at.filter(|_| evaluation.is_completed()) else {
            continue;
        };
        let name = index.name_of(&evaluation.employee_id);
        feed.push(Activity {
            at,
            kind: ActivityKind::EvaluationCompleted,
            employee_id: evaluation.employee_id.clone(),
            details: format!("{name} completed {}", evaluation.kind.label()),
            employee_name: name,
        });
    }

    for task in tasks {
        let Some(at) = task.completed_at.filter(|_| task.completed) else {
            continue;
        };
        let name = index.name_of(&task.employee_id);
        feed.push(Activity {
            at,
            kind: ActivityKind::TaskCompleted,
            employee_id: task.employee_id.clone(),
            details: format!("{name} completed \"{}\"", task.title),
            employee_name: name,
        });
    }

    feed.retain(|a| a.at <= now);
    feed.sort_by(|a, b| {
        b.at.cmp(&a.at)
            .then_with(|| a.employee_id.cmp(&b.employee_id))
            .then_with(|| a.details.cmp(&b.details))
    });
    feed.truncate(limit);
    feed
}
