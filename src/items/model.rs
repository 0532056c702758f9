//! Task, evaluation, and event data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::due::DueDate;

/// Priority tier of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Lower rank sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// A checklist task assigned to an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub employee_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
}

impl Task {
    pub fn new(employee_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            title: title.into(),
            due_date: None,
            completed: false,
            completed_at: None,
            priority: Priority::default(),
        }
    }

    /// Builder: set due date.
    pub fn with_due_date(mut self, due: impl Into<DueDate>) -> Self {
        self.due_date = Some(due.into());
        self
    }

    /// Builder: set priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder: mark completed.
    pub fn mark_completed(mut self, at: DateTime<Utc>) -> Self {
        self.completed = true;
        self.completed_at = Some(at);
        self
    }
}

/// Kind of evaluation or survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationKind {
    #[serde(rename = "30-day")]
    ThirtyDay,
    #[serde(rename = "mid-program")]
    MidProgram,
    #[serde(rename = "probation-end")]
    ProbationEnd,
    #[serde(rename = "survey")]
    Survey,
}

impl EvaluationKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ThirtyDay => "30-Day Review",
            Self::MidProgram => "Mid-Program Review",
            Self::ProbationEnd => "Probation End Review",
            Self::Survey => "Onboarding Survey",
        }
    }
}

/// Evaluation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Pending,
    Completed,
}

impl Default for EvaluationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A review or survey concerning an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Uuid,
    /// Employee being evaluated.
    pub employee_id: String,
    pub kind: EvaluationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDate>,
    #[serde(default)]
    pub status: EvaluationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Who is expected to complete it, usually the supervisor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<String>,
    /// Survey score out of 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Evaluation {
    pub fn new(employee_id: impl Into<String>, kind: EvaluationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            kind,
            due_date: None,
            status: EvaluationStatus::Pending,
            completed_at: None,
            reviewer_id: None,
            score: None,
        }
    }

    /// Builder: set due date.
    pub fn with_due_date(mut self, due: impl Into<DueDate>) -> Self {
        self.due_date = Some(due.into());
        self
    }

    /// Builder: set reviewer.
    pub fn with_reviewer(mut self, reviewer_id: impl Into<String>) -> Self {
        self.reviewer_id = Some(reviewer_id.into());
        self
    }

    /// Builder: mark completed, optionally with a survey score.
    pub fn mark_completed(mut self, at: DateTime<Utc>, score: Option<f32>) -> Self {
        self.status = EvaluationStatus::Completed;
        self.completed_at = Some(at);
        self.score = score;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == EvaluationStatus::Completed
    }
}

/// Kind of calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Meeting,
    Training,
    #[serde(rename = "event")]
    Social,
    Planning,
}

/// A scheduled event with its attendees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub kind: EventKind,
    pub starts_at: DueDate,
    #[serde(default)]
    pub attendee_ids: Vec<String>,
    #[serde(default)]
    pub cancelled: bool,
}

impl Event {
    pub fn new(title: impl Into<String>, kind: EventKind, starts_at: impl Into<DueDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            starts_at: starts_at.into(),
            attendee_ids: Vec::new(),
            cancelled: false,
        }
    }

    /// Builder: add attendees.
    pub fn with_attendees<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendee_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn is_attended_by(&self, employee_id: &str) -> bool {
        self.attendee_ids.iter().any(|id| id == employee_id)
    }
}

/// Something with a due date that a person has to act on.
pub trait Actionable {
    /// Id used for anomalies and attention subjects.
    fn item_id(&self) -> Uuid;
    fn employee_id(&self) -> &str;
    fn due(&self) -> Option<&DueDate>;
    fn is_done(&self) -> bool;
    /// Short label, e.g. the task title.
    fn label(&self) -> String;
}

impl Actionable for Task {
    fn item_id(&self) -> Uuid {
        self.id
    }
    fn employee_id(&self) -> &str {
        &self.employee_id
    }
    fn due(&self) -> Option<&DueDate> {
        self.due_date.as_ref()
    }
    fn is_done(&self) -> bool {
        self.completed
    }
    fn label(&self) -> String {
        self.title.clone()
    }
}

impl Actionable for Evaluation {
    fn item_id(&self) -> Uuid {
        self.id
    }
    fn employee_id(&self) -> &str {
        &self.employee_id
    }
    fn due(&self) -> Option<&DueDate> {
        self.due_date.as_ref()
    }
    fn is_done(&self) -> bool {
        self.is_completed()
    }
    fn label(&self) -> String {
        self.kind.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, d).unwrap()
    }

    #[test]
    fn new_task_defaults() {
        let task = Task::new("101", "Complete Compliance Training");
        assert!(!task.completed);
        assert!(task.due_date.is_none());
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn task_deserializes_with_defaults() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "employee_id": "101",
            "title": "Review Company Policies",
            "due_date": "2023-10-05"
        });
        let task: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(!task.completed);
        assert_eq!(task.due_date, Some(DueDate::Day(day(5))));
    }

    #[test]
    fn evaluation_kind_serde() {
        assert_eq!(serde_json::to_string(&EvaluationKind::ThirtyDay).unwrap(), "\"30-day\"");
        let parsed: EvaluationKind = serde_json::from_str("\"mid-program\"").unwrap();
        assert_eq!(parsed, EvaluationKind::MidProgram);
    }

    #[test]
    fn event_kind_serde() {
        let parsed: EventKind = serde_json::from_str("\"event\"").unwrap();
        assert_eq!(parsed, EventKind::Social);
        assert_eq!(serde_json::to_string(&EventKind::Training).unwrap(), "\"training\"");
    }

    #[test]
    fn priority_rank_orders_high_first() {
        let mut tiers = vec![Priority::Low, Priority::High, Priority::Medium];
        tiers.sort_by_key(Priority::rank);
        assert_eq!(tiers, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn actionable_reflects_completion() {
        let task = Task::new("1", "T").with_due_date(day(10));
        assert!(!task.is_done());
        let done = task.mark_completed(chrono::Utc::now());
        assert!(done.is_done());

        let eval = Evaluation::new("1", EvaluationKind::Survey);
        assert!(!eval.is_done());
        assert_eq!(Actionable::label(&eval), "Onboarding Survey");
    }

    #[test]
    fn event_attendance() {
        let event = Event::new("Team Check-in", EventKind::Meeting, day(12)).with_attendees(["101", "102"]);
        assert!(event.is_attended_by("102"));
        assert!(!event.is_attended_by("103"));
    }
}
