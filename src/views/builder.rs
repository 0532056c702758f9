//! Builds the view for one role from a snapshot.
//!
//! Every build is a pure function of the request, the snapshot, `now`, and the
//! engine config. Contract violations (unknown role or requester, an employee
//! without a record) fail the call; data problems inside the scope are
//! collected into the view's `anomalies` instead.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::anomaly::{self, Anomaly, AnomalyKind};
use crate::attention::AttentionRanker;
use crate::attention::ranker::check_due;
use crate::config::EngineConfig;
use crate::error::ViewError;
use crate::items::{Evaluation, Task};
use crate::metrics::{self, PerformanceInputs};
use crate::onboarding::{Employee, Program, ProgramType, Role, Stage};
use crate::snapshot::{Enrollment, Snapshot, SnapshotIndex};

use super::activity::recent_activity;
use super::model::{
    EmployeeView, EvaluationRow, HrView, ManagerView, OrgMetrics, PendingReview, ProgramBreakdown,
    RoleView, SupervisorView, TaskRow, TeamMember, TeamOverview, TeamPerformance, UpcomingEvent,
};
use super::scope;

/// Which view to build, and for whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub role: Role,
    pub requester_id: String,
}

impl ViewRequest {
    pub fn new(role: Role, requester_id: impl Into<String>) -> Self {
        Self {
            role,
            requester_id: requester_id.into(),
        }
    }

    /// Parse a role name from an outer surface. Unknown names are rejected.
    pub fn parse(role: &str, requester_id: impl Into<String>) -> Result<Self, ViewError> {
        Ok(Self::new(role.parse()?, requester_id))
    }
}

/// Build the requested view.
///
/// HR sees the whole organisation and does not need to appear in the snapshot;
/// every other role must. The supervisor view is open to supervisors and
/// managers, the manager view to managers only. Anyone with an onboarding
/// record may open their own employee view.
pub fn build(
    request: &ViewRequest,
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<RoleView, ViewError> {
    let index = snapshot.index();

    let view = match request.role {
        Role::Employee => {
            let employee = requester(&index, &request.requester_id)?;
            RoleView::Employee(employee_view(&index, employee, now, config)?)
        }
        Role::Supervisor => {
            let supervisor = requester(&index, &request.requester_id)?;
            require_role(supervisor, Role::Supervisor, &[Role::Supervisor, Role::Manager])?;
            RoleView::Supervisor(supervisor_view(&index, supervisor, now, config))
        }
        Role::Manager => {
            let manager = requester(&index, &request.requester_id)?;
            require_role(manager, Role::Manager, &[Role::Manager])?;
            RoleView::Manager(manager_view(&index, manager, now, config))
        }
        Role::Hr => RoleView::Hr(hr_view(&index, now, config)),
    };

    let anomalies = view.anomalies().len();
    if anomalies > 0 {
        warn!(
            role = %request.role,
            requester_id = %request.requester_id,
            anomalies,
            "Role view built with data anomalies"
        );
    } else {
        debug!(role = %request.role, requester_id = %request.requester_id, "Role view built");
    }

    Ok(view)
}

fn requester<'a>(index: &SnapshotIndex<'a>, id: &str) -> Result<&'a Employee, ViewError> {
    index
        .employee(id)
        .ok_or_else(|| ViewError::UnknownRequester { id: id.to_string() })
}

fn require_role(requester: &Employee, requested: Role, allowed: &[Role]) -> Result<(), ViewError> {
    if allowed.contains(&requester.role) {
        return Ok(());
    }
    Err(ViewError::RoleMismatch {
        id: requester.id.clone(),
        role: requester.role,
        requested,
    })
}

fn employee_view(
    index: &SnapshotIndex<'_>,
    employee: &Employee,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<EmployeeView, ViewError> {
    let record = index
        .record(&employee.id)
        .ok_or_else(|| ViewError::MissingRecord {
            employee_id: employee.id.clone(),
        })?;
    let days_in_stage = record.days_in_stage(now)?;

    let ids = HashSet::from([employee.id.as_str()]);
    let mut anomalies = record.validate();
    anomalies.extend(index_anomalies(index, &ids));

    let mut pending_tasks: Vec<TaskRow> = index
        .snapshot
        .tasks
        .iter()
        .filter(|t| t.employee_id == employee.id && !t.completed)
        .map(|task| {
            let due = resolve_or_report(check_due(task), &mut anomalies);
            TaskRow {
                id: task.id,
                title: task.title.clone(),
                due,
                priority: task.priority,
                overdue: due.is_some_and(|d| d < now),
            }
        })
        .collect();
    pending_tasks.sort_by(|a, b| {
        due_key(a.due)
            .cmp(&due_key(b.due))
            .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
            .then_with(|| a.title.cmp(&b.title))
    });

    let evaluations = scoped_evaluations(index.snapshot, &ids);
    let evaluations_due = pending_evaluations(index, &evaluations, &mut anomalies);
    let upcoming_events = upcoming_events(
        index.snapshot,
        &ids,
        now,
        config.upcoming_event_window(),
        &mut anomalies,
    );

    anomaly::normalize(&mut anomalies);

    Ok(EmployeeView {
        employee_id: employee.id.clone(),
        name: employee.name.clone(),
        program: employee.program,
        program_label: program_label(index, employee.program),
        record: record.clone(),
        stage: record.stage,
        stage_label: record.stage.label().to_string(),
        progress_percent: record.progress,
        days_in_stage,
        pending_tasks,
        evaluations_due,
        upcoming_events,
        anomalies,
    })
}

fn supervisor_view(
    index: &SnapshotIndex<'_>,
    supervisor: &Employee,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> SupervisorView {
    let team: Vec<&Employee> = scope::direct_reports(index.snapshot, &supervisor.id)
        .into_iter()
        .filter(|e| !e.has_left_by(now))
        .collect();
    let ids: HashSet<&str> = team.iter().map(|e| e.id.as_str()).collect();
    let enrollments = index.enrollments_for(team.iter().copied());

    let mut anomalies = record_anomalies(&enrollments);
    anomalies.extend(index_anomalies(index, &ids));

    let tasks = scoped_tasks(index.snapshot, &ids);
    let evaluations = scoped_evaluations(index.snapshot, &ids);
    let attention =
        AttentionRanker::from_config(config).rank(index, &tasks, &evaluations, &enrollments, now);
    anomalies.extend(attention.anomalies);

    let new_hire_days = i64::from(config.new_hire_days);
    let new_count = enrollments
        .iter()
        .filter(|e| e.record.days_in_program(now).is_ok_and(|d| d <= new_hire_days))
        .count();
    let completing_count = enrollments
        .iter()
        .filter(|e| e.record.stage == Stage::Excel && e.record.progress < 100)
        .count();

    let team_performance = TeamPerformance {
        average_progress: metrics::average_progress(&enrollments),
        evaluation_completion: metrics::evaluation_completion_rate(evaluations.iter().copied()),
        training_completion: metrics::task_completion_rate(tasks.iter().copied()),
    };

    let mut team_members: Vec<TeamMember> = enrollments
        .iter()
        .map(|e| TeamMember {
            employee_id: e.employee.id.clone(),
            name: e.employee.name.clone(),
            job_title: e.employee.job_title.clone(),
            program: e.program(),
            program_label: program_label(index, e.program()),
            stage: e.record.stage,
            progress: e.record.progress,
            days_in_program: e.record.days_in_program(now).ok(),
        })
        .collect();
    team_members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.employee_id.cmp(&b.employee_id)));

    // Evaluations assigned to this supervisor as reviewer, outside the team.
    let mut reviewable = evaluations.clone();
    reviewable.extend(index.snapshot.evaluations.iter().filter(|e| {
        e.reviewer_id.as_deref() == Some(supervisor.id.as_str())
            && !ids.contains(e.employee_id.as_str())
    }));
    let pending_evaluations = pending_evaluations(index, &reviewable, &mut anomalies);

    let mut attendees = ids.clone();
    attendees.insert(supervisor.id.as_str());
    let upcoming_events = upcoming_events(
        index.snapshot,
        &attendees,
        now,
        config.upcoming_event_window(),
        &mut anomalies,
    );

    anomaly::normalize(&mut anomalies);

    SupervisorView {
        team_size: enrollments.len(),
        new_count,
        completing_count,
        team_performance,
        pending_evaluations,
        attention_items: attention.items,
        team_members,
        upcoming_events,
        anomalies,
    }
}

fn manager_view(
    index: &SnapshotIndex<'_>,
    manager: &Employee,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> ManagerView {
    let (subtree, mut anomalies) = scope::subtree(index.snapshot, &manager.id);
    let active: Vec<&Employee> = subtree.iter().copied().filter(|e| !e.has_left_by(now)).collect();
    let ids: HashSet<&str> = active.iter().map(|e| e.id.as_str()).collect();
    let enrollments = index.enrollments_for(active.iter().copied());

    anomalies.extend(record_anomalies(&enrollments));
    anomalies.extend(index_anomalies(index, &ids));

    let tasks = scoped_tasks(index.snapshot, &ids);
    let evaluations = scoped_evaluations(index.snapshot, &ids);

    let completed = metrics::completed_count(&enrollments);
    let team_overview = TeamOverview {
        total_employees: enrollments.len(),
        in_onboarding: enrollments.len() - completed,
        completed_onboarding: completed,
        distribution: metrics::distribution(&enrollments),
    };

    let performance_metrics = metrics::performance_metrics(
        PerformanceInputs {
            training_completion: metrics::task_completion_rate(tasks.iter().copied()),
            satisfaction: metrics::average_survey_score(evaluations.iter().copied()),
            time_to_productivity: metrics::time_to_productivity(&enrollments),
            retention: metrics::retention_rate(subtree.iter().copied(), now, config.retention_window()),
        },
        &config.targets,
    );

    let pending_reviews = pending_evaluations(index, &evaluations, &mut anomalies)
        .into_iter()
        .map(|evaluation| {
            let supervisor_id = index
                .employee(&evaluation.employee_id)
                .and_then(|e| e.supervisor_id.clone());
            let supervisor_name = supervisor_id.as_deref().map(|id| index.name_of(id));
            PendingReview {
                evaluation,
                supervisor_id,
                supervisor_name,
            }
        })
        .collect();

    let program_breakdown = ProgramType::ALL
        .iter()
        .map(|&program| {
            let members: Vec<Enrollment<'_>> = enrollments
                .iter()
                .copied()
                .filter(|e| e.program() == Some(program))
                .collect();
            let definition = index.program(program);
            ProgramBreakdown {
                program,
                label: definition.map_or(program.label(), Program::label).to_string(),
                count: members.len(),
                average_progress: metrics::average_progress(&members),
                average_days_in_program: metrics::average_days_in_program(&members, now),
                expected_days: definition.and_then(|d| d.expected_days),
            }
        })
        .collect();

    let mut attendees = ids.clone();
    attendees.insert(manager.id.as_str());
    let upcoming_events = upcoming_events(
        index.snapshot,
        &attendees,
        now,
        config.upcoming_event_window(),
        &mut anomalies,
    );

    anomaly::normalize(&mut anomalies);

    ManagerView {
        team_overview,
        performance_metrics,
        pending_reviews,
        program_breakdown,
        upcoming_events,
        anomalies,
    }
}

fn hr_view(index: &SnapshotIndex<'_>, now: DateTime<Utc>, config: &EngineConfig) -> HrView {
    let snapshot = index.snapshot;
    let enrollments =
        index.enrollments_for(snapshot.employees.iter().filter(|e| !e.has_left_by(now)));

    let mut anomalies = index.anomalies.clone();
    anomalies.extend(record_anomalies(&enrollments));

    // Items of unknown employees stay in so the ranker can report them.
    let still_here = |employee_id: &str| index.employee(employee_id).is_none_or(|e| !e.has_left_by(now));
    let tasks: Vec<&Task> = snapshot.tasks.iter().filter(|t| still_here(&t.employee_id)).collect();
    let evaluations: Vec<&Evaluation> = snapshot
        .evaluations
        .iter()
        .filter(|e| still_here(&e.employee_id))
        .collect();

    let org_metrics = OrgMetrics {
        active_employees: snapshot.employees.iter().filter(|e| e.is_active_at(now)).count(),
        pending_onboarding: enrollments
            .iter()
            .filter(|e| e.record.stage == Stage::Prepare)
            .count(),
        completed_this_month: metrics::completed_in_month(&enrollments, now),
        retention_rate: metrics::retention_rate(&snapshot.employees, now, config.retention_window()),
        average_progress: metrics::average_progress(&enrollments),
    };

    let attention =
        AttentionRanker::from_config(config).rank(index, &tasks, &evaluations, &enrollments, now);
    anomalies.extend(attention.anomalies);

    let recent_activity = recent_activity(
        index,
        &enrollments,
        &tasks,
        &evaluations,
        now,
        config.recent_activity_limit,
    );

    anomaly::normalize(&mut anomalies);

    HrView {
        org_metrics,
        program_distribution: metrics::distribution(&enrollments),
        attention_items: attention.items,
        recent_activity,
        anomalies,
    }
}

fn scoped_tasks<'a>(snapshot: &'a Snapshot, ids: &HashSet<&str>) -> Vec<&'a Task> {
    snapshot
        .tasks
        .iter()
        .filter(|t| ids.contains(t.employee_id.as_str()))
        .collect()
}

fn scoped_evaluations<'a>(snapshot: &'a Snapshot, ids: &HashSet<&str>) -> Vec<&'a Evaluation> {
    snapshot
        .evaluations
        .iter()
        .filter(|e| ids.contains(e.employee_id.as_str()))
        .collect()
}

fn record_anomalies(enrollments: &[Enrollment<'_>]) -> Vec<Anomaly> {
    enrollments.iter().flat_map(|e| e.record.validate()).collect()
}

/// Join anomalies that concern someone in scope.
fn index_anomalies(index: &SnapshotIndex<'_>, ids: &HashSet<&str>) -> Vec<Anomaly> {
    index
        .anomalies
        .iter()
        .filter(|a| ids.contains(a.subject.as_str()))
        .cloned()
        .collect()
}

fn resolve_or_report(
    due: Result<DateTime<Utc>, Anomaly>,
    anomalies: &mut Vec<Anomaly>,
) -> Option<DateTime<Utc>> {
    due.map_err(|a| anomalies.push(a)).ok()
}

/// Sorts known dates ascending, unknown ones last.
fn due_key(due: Option<DateTime<Utc>>) -> (bool, Option<DateTime<Utc>>) {
    (due.is_none(), due)
}

fn pending_evaluations(
    index: &SnapshotIndex<'_>,
    evaluations: &[&Evaluation],
    anomalies: &mut Vec<Anomaly>,
) -> Vec<EvaluationRow> {
    let mut rows: Vec<EvaluationRow> = evaluations
        .iter()
        .filter(|e| !e.is_completed())
        .map(|evaluation| EvaluationRow {
            id: evaluation.id,
            employee_id: evaluation.employee_id.clone(),
            employee_name: index.name_of(&evaluation.employee_id),
            kind: evaluation.kind,
            label: evaluation.kind.label().to_string(),
            due: resolve_or_report(check_due(*evaluation), anomalies),
        })
        .collect();
    rows.sort_by(|a, b| {
        due_key(a.due)
            .cmp(&due_key(b.due))
            .then_with(|| a.employee_name.cmp(&b.employee_name))
            .then_with(|| a.id.cmp(&b.id))
    });
    rows
}

/// Non-cancelled events attended by anyone in `attendees`, starting within
/// `[now, now + window]`, soonest first.
fn upcoming_events(
    snapshot: &Snapshot,
    attendees: &HashSet<&str>,
    now: DateTime<Utc>,
    window: TimeDelta,
    anomalies: &mut Vec<Anomaly>,
) -> Vec<UpcomingEvent> {
    let until = now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC);
    let mut events: Vec<UpcomingEvent> = snapshot
        .events
        .iter()
        .filter(|e| !e.cancelled && e.attendee_ids.iter().any(|id| attendees.contains(id.as_str())))
        .filter_map(|event| {
            let Some(starts_at) = event.starts_at.resolve() else {
                anomalies.push(Anomaly::new(
                    AnomalyKind::MalformedDueDate,
                    event.id.to_string(),
                    format!("{} has an unreadable start date", event.title),
                ));
                return None;
            };
            (starts_at >= now && starts_at <= until).then(|| UpcomingEvent {
                id: event.id,
                title: event.title.clone(),
                kind: event.kind,
                starts_at,
                attendee_count: event.attendee_ids.len(),
            })
        })
        .collect();
    events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.title.cmp(&b.title)));
    events
}

fn program_label(index: &SnapshotIndex<'_>, program: Option<ProgramType>) -> Option<String> {
    program.map(|p| index.program(p).map_or(p.label(), Program::label).to_string())
}
