//! Serialized shapes of the four role views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anomaly::Anomaly;
use crate::attention::AttentionItem;
use crate::items::{EvaluationKind, EventKind, Priority};
use crate::measure::Measure;
use crate::metrics::{PerformanceMetric, ProgramShare};
use crate::onboarding::{OnboardingRecord, ProgramType, Role, Stage};

use super::activity::Activity;

/// The view for one role, tagged by role when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleView {
    Employee(EmployeeView),
    Supervisor(SupervisorView),
    Manager(ManagerView),
    Hr(HrView),
}

impl RoleView {
    pub fn role(&self) -> Role {
        match self {
            Self::Employee(_) => Role::Employee,
            Self::Supervisor(_) => Role::Supervisor,
            Self::Manager(_) => Role::Manager,
            Self::Hr(_) => Role::Hr,
        }
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        match self {
            Self::Employee(v) => &v.anomalies,
            Self::Supervisor(v) => &v.anomalies,
            Self::Manager(v) => &v.anomalies,
            Self::Hr(v) => &v.anomalies,
        }
    }
}

/// An open task as listed to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: Uuid,
    pub title: String,
    /// None when the stored date is missing or unreadable.
    pub due: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub overdue: bool,
}

/// A pending evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub id: Uuid,
    pub employee_id: String,
    pub employee_name: String,
    pub kind: EvaluationKind,
    pub label: String,
    pub due: Option<DateTime<Utc>>,
}

/// A pending evaluation seen from above, with the employee's supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    #[serde(flatten)]
    pub evaluation: EvaluationRow,
    pub supervisor_id: Option<String>,
    pub supervisor_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingEvent {
    pub id: Uuid,
    pub title: String,
    pub kind: EventKind,
    pub starts_at: DateTime<Utc>,
    pub attendee_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeView {
    pub employee_id: String,
    pub name: String,
    pub program: Option<ProgramType>,
    pub program_label: Option<String>,
    pub record: OnboardingRecord,
    pub stage: Stage,
    pub stage_label: String,
    pub progress_percent: u8,
    pub days_in_stage: i64,
    /// Open tasks, soonest due first, then by priority.
    pub pending_tasks: Vec<TaskRow>,
    pub evaluations_due: Vec<EvaluationRow>,
    pub upcoming_events: Vec<UpcomingEvent>,
    pub anomalies: Vec<Anomaly>,
}

/// One direct report as shown to a supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub employee_id: String,
    pub name: String,
    pub job_title: Option<String>,
    pub program: Option<ProgramType>,
    pub program_label: Option<String>,
    pub stage: Stage,
    pub progress: u8,
    /// None when the record has no stage history.
    pub days_in_program: Option<i64>,
}

/// Progress and completion rates across a supervisor's team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPerformance {
    /// Mean progress of members not yet at the terminal stage.
    pub average_progress: Measure<f64>,
    pub evaluation_completion: Measure<u8>,
    pub training_completion: Measure<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorView {
    pub team_size: usize,
    pub new_count: usize,
    pub completing_count: usize,
    pub team_performance: TeamPerformance,
    pub pending_evaluations: Vec<EvaluationRow>,
    pub attention_items: Vec<AttentionItem>,
    pub team_members: Vec<TeamMember>,
    pub upcoming_events: Vec<UpcomingEvent>,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamOverview {
    pub total_employees: usize,
    pub in_onboarding: usize,
    pub completed_onboarding: usize,
    pub distribution: Vec<ProgramShare>,
}

/// Per-program summary for a manager's subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramBreakdown {
    pub program: ProgramType,
    pub label: String,
    pub count: usize,
    pub average_progress: Measure<f64>,
    pub average_days_in_program: Measure<f64>,
    pub expected_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerView {
    pub team_overview: TeamOverview,
    pub performance_metrics: Vec<PerformanceMetric>,
    pub pending_reviews: Vec<PendingReview>,
    pub program_breakdown: Vec<ProgramBreakdown>,
    pub upcoming_events: Vec<UpcomingEvent>,
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgMetrics {
    pub active_employees: usize,
    /// Records still in the first stage.
    pub pending_onboarding: usize,
    pub completed_this_month: usize,
    pub retention_rate: Measure<u8>,
    pub average_progress: Measure<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrView {
    pub org_metrics: OrgMetrics,
    pub program_distribution: Vec<ProgramShare>,
    pub attention_items: Vec<AttentionItem>,
    pub recent_activity: Vec<Activity>,
    pub anomalies: Vec<Anomaly>,
}
