//! Attention ranker: classifies open items and orders them by urgency.
//!
//! Classification, first match wins:
//! - overdue: due strictly before now, not completed
//! - due soon: due within the horizon, not completed
//! - stalled: record has sat in a non-terminal stage past the threshold
//!
//! Ordering is severity (overdue, stalled, due soon), then due date, then
//! employee name, then subject id, so identical input always ranks the same.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::anomaly::{Anomaly, AnomalyKind};
use crate::config::EngineConfig;
use crate::items::{Actionable, DateProblem, Evaluation, EvaluationKind, Task, due};
use crate::onboarding::Stage;
use crate::snapshot::{Enrollment, SnapshotIndex};

/// Why an item needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionKind {
    Overdue,
    Stalled,
    DueSoon,
}

impl AttentionKind {
    /// Lower sorts first.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Overdue => 0,
            Self::Stalled => 1,
            Self::DueSoon => 2,
        }
    }
}

/// What an attention item points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttentionSubject {
    Task { id: Uuid },
    Evaluation { id: Uuid, kind: EvaluationKind },
    Onboarding { stage: Stage },
}

impl AttentionSubject {
    fn sort_key(&self, employee_id: &str) -> String {
        match self {
            Self::Task { id } | Self::Evaluation { id, .. } => id.to_string(),
            Self::Onboarding { .. } => employee_id.to_string(),
        }
    }
}

/// One ranked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionItem {
    pub subject: AttentionSubject,
    pub employee_id: String,
    pub employee_name: String,
    pub kind: AttentionKind,
    /// Due date, or for stalled records the moment the record became stalled.
    pub due: DateTime<Utc>,
    pub reason: String,
}

/// Ranked items plus anything that could not be ranked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttentionReport {
    pub items: Vec<AttentionItem>,
    pub anomalies: Vec<Anomaly>,
}

/// Thresholds for classification.
#[derive(Debug, Clone, Copy)]
pub struct AttentionRanker {
    due_soon_horizon: TimeDelta,
    stall_threshold: TimeDelta,
}

impl AttentionRanker {
    pub fn new(due_soon_horizon: TimeDelta, stall_threshold: TimeDelta) -> Self {
        Self {
            due_soon_horizon,
            stall_threshold,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.due_soon_horizon(), config.stall_threshold())
    }

    /// Rank open tasks, open evaluations, and stalled records.
    ///
    /// `index` supplies employee names. Inputs are only read.
    pub fn rank(
        &self,
        index: &SnapshotIndex<'_>,
        tasks: &[&Task],
        evaluations: &[&Evaluation],
        enrollments: &[Enrollment<'_>],
        now: DateTime<Utc>,
    ) -> AttentionReport {
        let mut report = AttentionReport::default();

        for task in tasks {
            self.rank_actionable(index, *task, AttentionSubject::Task { id: task.id }, now, &mut report);
        }
        for evaluation in evaluations {
            let subject = AttentionSubject::Evaluation {
                id: evaluation.id,
                kind: evaluation.kind,
            };
            self.rank_actionable(index, *evaluation, subject, now, &mut report);
        }
        for enrollment in enrollments {
            self.rank_record(enrollment, now, &mut report);
        }

        report.items.sort_by(|a, b| {
            a.kind
                .severity()
                .cmp(&b.kind.severity())
                .then_with(|| a.due.cmp(&b.due))
                .then_with(|| a.employee_name.cmp(&b.employee_name))
                .then_with(|| {
                    a.subject
                        .sort_key(&a.employee_id)
                        .cmp(&b.subject.sort_key(&b.employee_id))
                })
        });

        debug!(
            items = report.items.len(),
            anomalies = report.anomalies.len(),
            "Ranked attention items"
        );
        report
    }

    fn classify_due(&self, due: DateTime<Utc>, now: DateTime<Utc>) -> Option<AttentionKind> {
        if due < now {
            Some(AttentionKind::Overdue)
        } else if due - now <= self.due_soon_horizon {
            Some(AttentionKind::DueSoon)
        } else {
            None
        }
    }

    fn rank_actionable(
        &self,
        index: &SnapshotIndex<'_>,
        item: &dyn Actionable,
        subject: AttentionSubject,
        now: DateTime<Utc>,
        report: &mut AttentionReport,
    ) {
        if item.is_done() {
            return;
        }

        let due = match check_due(item) {
            Ok(due) => due,
            Err(anomaly) => {
                report.anomalies.push(anomaly);
                return;
            }
        };

        let Some(kind) = self.classify_due(due, now) else {
            return;
        };

        let employee_id = item.employee_id();
        let employee_name = match index.employee(employee_id) {
            Some(e) => e.name.clone(),
            None => {
                report.anomalies.push(Anomaly::new(
                    AnomalyKind::UnknownEmployee,
                    item.item_id().to_string(),
                    format!("{} references unknown employee {employee_id}", item.label()),
                ));
                employee_id.to_string()
            }
        };

        let date = due.format("%Y-%m-%d");
        let reason = match kind {
            AttentionKind::Overdue => format!("{} overdue since {date}", item.label()),
            _ => format!("{} due {date}", item.label()),
        };

        report.items.push(AttentionItem {
            subject,
            employee_id: employee_id.to_string(),
            employee_name,
            kind,
            due,
            reason,
        });
    }

    fn rank_record(&self, enrollment: &Enrollment<'_>, now: DateTime<Utc>, report: &mut AttentionReport) {
        let record = enrollment.record;
        if record.stage.is_terminal() {
            return;
        }
        let Some(entered) = record.stage_entered_at() else {
            report.anomalies.push(Anomaly::new(
                AnomalyKind::EmptyHistory,
                &record.employee_id,
                "onboarding record has no stage history",
            ));
            return;
        };

        let stalled_since = entered
            .checked_add_signed(self.stall_threshold)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if now <= stalled_since {
            return;
        }

        let days = (now - entered).num_days();
        report.items.push(AttentionItem {
            subject: AttentionSubject::Onboarding { stage: record.stage },
            employee_id: record.employee_id.clone(),
            employee_name: enrollment.employee.name.clone(),
            kind: AttentionKind::Stalled,
            due: stalled_since,
            reason: format!(
                "Onboarding stalled at \"{}\" stage for {days} days",
                record.stage.label()
            ),
        });
    }
}

/// Resolve an item's due date, or describe why it cannot be used.
pub(crate) fn check_due(item: &dyn Actionable) -> Result<DateTime<Utc>, Anomaly> {
    let id = item.item_id().to_string();
    due::resolve(item.due()).map_err(|problem| match problem {
        DateProblem::Missing => Anomaly::new(
            AnomalyKind::MissingDueDate,
            id,
            format!("{} has no due date", item.label()),
        ),
        DateProblem::Malformed(raw) => Anomaly::new(
            AnomalyKind::MalformedDueDate,
            id,
            format!("{} has unreadable due date {raw}", item.label()),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    use crate::items::DueDate;
    use crate::onboarding::{Employee, OnboardingRecord, Role, TransitionMode};
    use crate::snapshot::Snapshot;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, 1, 12, 0, 0).unwrap()
    }

    fn oct(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, d).unwrap()
    }

    fn person(id: &str, name: &str) -> Employee {
        Employee::new(id, name, Role::Employee, NaiveDate::from_ymd_opt(2023, 8, 1).unwrap())
    }

    fn ranker() -> AttentionRanker {
        AttentionRanker::from_config(&EngineConfig::default())
    }

    fn rank_all(snapshot: &Snapshot) -> AttentionReport {
        let index = snapshot.index();
        let tasks: Vec<&Task> = snapshot.tasks.iter().collect();
        let evaluations: Vec<&Evaluation> = snapshot.evaluations.iter().collect();
        let enrollments = index.all_enrollments();
        ranker().rank(&index, &tasks, &evaluations, &enrollments, now())
    }

    /// A overdue Oct 1; B stalled; C due soon Oct 2; D overdue Oct 1, "Aaron".
    fn ordering_snapshot() -> Snapshot {
        let land_since = now() - Duration::days(21);
        let stalled = OnboardingRecord::start("b", land_since - Duration::days(2))
            .advance(Stage::Orient, land_since - Duration::days(1), TransitionMode::Standard)
            .unwrap()
            .advance(Stage::Land, land_since, TransitionMode::Standard)
            .unwrap();

        Snapshot {
            employees: vec![
                person("a", "Alex Johnson"),
                person("b", "Marco Torres"),
                person("c", "Sophia Chen"),
                person("d", "Aaron Blake"),
            ],
            onboarding_records: vec![stalled],
            tasks: vec![
                Task::new("a", "Complete Compliance Training").with_due_date(oct(1)),
                Task::new("c", "Submit Feedback Form").with_due_date(oct(2)),
            ],
            evaluations: vec![Evaluation::new("d", EvaluationKind::ThirtyDay).with_due_date(oct(1))],
            ..Default::default()
        }
    }

    #[test]
    fn severity_then_due_then_name() {
        let report = rank_all(&ordering_snapshot());
        let order: Vec<&str> = report.items.iter().map(|i| i.employee_id.as_str()).collect();
        assert_eq!(order, vec!["d", "a", "b", "c"]);

        let kinds: Vec<AttentionKind> = report.items.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AttentionKind::Overdue,
                AttentionKind::Overdue,
                AttentionKind::Stalled,
                AttentionKind::DueSoon,
            ]
        );
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn ranking_is_deterministic() {
        let snapshot = ordering_snapshot();
        assert_eq!(rank_all(&snapshot), rank_all(&snapshot));
    }

    #[test]
    fn reasons_follow_fixed_templates() {
        let report = rank_all(&ordering_snapshot());
        assert_eq!(report.items[0].reason, "30-Day Review overdue since 2023-10-01");
        assert_eq!(report.items[2].reason, "Onboarding stalled at \"Land\" stage for 21 days");
        assert_eq!(report.items[3].reason, "Submit Feedback Form due 2023-10-02");
    }

    #[test]
    fn completed_and_distant_items_are_skipped() {
        let snapshot = Snapshot {
            employees: vec![person("a", "Alex")],
            tasks: vec![
                Task::new("a", "Done").with_due_date(oct(1)).mark_completed(now()),
                Task::new("a", "Later").with_due_date(oct(20)),
                // Completed items are never checked for dates
                Task::new("a", "No date but done").mark_completed(now()),
            ],
            ..Default::default()
        };
        let report = rank_all(&snapshot);
        assert!(report.items.is_empty());
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn bad_due_dates_become_anomalies() {
        let mut malformed = Task::new("a", "Mystery");
        malformed.due_date = Some(DueDate::Malformed(serde_json::json!("soon")));
        let snapshot = Snapshot {
            employees: vec![person("a", "Alex")],
            tasks: vec![malformed, Task::new("a", "Undated")],
            ..Default::default()
        };
        let report = rank_all(&snapshot);
        assert!(report.items.is_empty());
        let kinds: Vec<AnomalyKind> = report.anomalies.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AnomalyKind::MalformedDueDate, AnomalyKind::MissingDueDate]);
    }

    #[test]
    fn terminal_and_fresh_records_are_not_stalled() {
        let long_ago = now() - Duration::days(60);
        let mut excel = OnboardingRecord::start("a", long_ago);
        for stage in &Stage::ALL[1..] {
            excel = excel.advance(*stage, long_ago, TransitionMode::Standard).unwrap();
        }
        let fresh = OnboardingRecord::start("b", now() - Duration::days(14));
        let snapshot = Snapshot {
            employees: vec![person("a", "Alex"), person("b", "Bea")],
            onboarding_records: vec![excel, fresh],
            ..Default::default()
        };
        assert!(rank_all(&snapshot).items.is_empty());
    }

    #[test]
    fn due_window_boundaries() {
        let horizon = Duration::days(3);
        let just_missed = Task::new("a", "Just missed").with_due_date(now() - Duration::seconds(1));
        let due_now = Task::new("a", "Due now").with_due_date(now());
        let at_horizon = Task::new("a", "Edge of horizon").with_due_date(now() + horizon);
        let past_horizon =
            Task::new("a", "Past horizon").with_due_date(now() + horizon + Duration::seconds(1));
        let expected = vec![
            (AttentionSubject::Task { id: just_missed.id }, AttentionKind::Overdue),
            (AttentionSubject::Task { id: due_now.id }, AttentionKind::DueSoon),
            (AttentionSubject::Task { id: at_horizon.id }, AttentionKind::DueSoon),
        ];
        let snapshot = Snapshot {
            employees: vec![person("a", "Alex")],
            tasks: vec![past_horizon, at_horizon, due_now, just_missed],
            ..Default::default()
        };
        let report = rank_all(&snapshot);
        let ranked: Vec<(AttentionSubject, AttentionKind)> =
            report.items.into_iter().map(|i| (i.subject, i.kind)).collect();
        assert_eq!(ranked, expected);
    }

    #[test]
    fn stall_threshold_boundary() {
        let threshold = Duration::days(14);
        let at_threshold = OnboardingRecord::start("a", now() - threshold);
        let just_past = OnboardingRecord::start("b", now() - threshold - Duration::seconds(1));
        let snapshot = Snapshot {
            employees: vec![person("a", "Alex"), person("b", "Bea")],
            onboarding_records: vec![at_threshold, just_past],
            ..Default::default()
        };
        let report = rank_all(&snapshot);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].employee_id, "b");
        assert_eq!(report.items[0].kind, AttentionKind::Stalled);
        assert_eq!(report.items[0].due, now() - Duration::seconds(1));
    }

    #[test]
    fn oversized_stall_threshold_never_stalls() {
        let ranker = AttentionRanker::new(Duration::days(3), Duration::days(i64::from(u32::MAX)));
        let snapshot = Snapshot {
            employees: vec![person("a", "Alex")],
            onboarding_records: vec![OnboardingRecord::start("a", now() - Duration::days(3000))],
            ..Default::default()
        };
        let index = snapshot.index();
        let enrollments = index.all_enrollments();
        let report = ranker.rank(&index, &[], &[], &enrollments, now());
        assert!(report.items.is_empty());
    }

    #[test]
    fn unknown_employee_is_ranked_and_reported() {
        let snapshot = Snapshot {
            tasks: vec![Task::new("ghost", "Orphaned").with_due_date(oct(1))],
            ..Default::default()
        };
        let report = rank_all(&snapshot);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].employee_name, "ghost");
        assert_eq!(report.anomalies[0].kind, AnomalyKind::UnknownEmployee);
    }
}
