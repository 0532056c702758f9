//! Counts, distributions, rates, and averages over enrollments.
//!
//! Every function here is pure: it borrows its input, allocates a fresh
//! result, and can be called repeatedly or from several threads at once.
//! Scoping (a supervisor's team, a calendar month) is done by the caller
//! filtering the slice before calling in.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::items::{Evaluation, EvaluationKind, Task};
use crate::measure::{self, Measure};
use crate::onboarding::{Employee, ProgramType, Stage};
use crate::snapshot::Enrollment;

/// Enrollment count per program. Programs with no enrollments are absent.
pub fn count_by_program(enrollments: &[Enrollment<'_>]) -> BTreeMap<ProgramType, usize> {
    let mut counts = BTreeMap::new();
    for program in enrollments.iter().filter_map(Enrollment::program) {
        *counts.entry(program).or_insert(0) += 1;
    }
    counts
}

/// Enrollment count per current stage. Stages with no records are absent.
pub fn count_by_stage(enrollments: &[Enrollment<'_>]) -> BTreeMap<Stage, usize> {
    let mut counts = BTreeMap::new();
    for e in enrollments {
        *counts.entry(e.record.stage).or_insert(0) += 1;
    }
    counts
}

/// One program's share of the enrolled population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramShare {
    pub program: ProgramType,
    pub label: String,
    pub count: usize,
    /// `count / total`, or 0 when nobody is enrolled.
    pub fraction: f64,
}

/// Share of every program in canonical order, including empty ones.
pub fn distribution(enrollments: &[Enrollment<'_>]) -> Vec<ProgramShare> {
    let counts = count_by_program(enrollments);
    let total: usize = counts.values().sum();

    ProgramType::ALL
        .iter()
        .map(|&program| {
            let count = counts.get(&program).copied().unwrap_or(0);
            let fraction = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            };
            ProgramShare {
                program,
                label: program.label().to_string(),
                count,
                fraction,
            }
        })
        .collect()
}

/// Active employees as a share of active plus those who left within the
/// trailing `window`, rounded to a whole percentage.
pub fn retention_rate<'a, I>(employees: I, as_of: DateTime<Utc>, window: TimeDelta) -> Measure<u8>
where
    I: IntoIterator<Item = &'a Employee>,
{
    let window_start = as_of.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let (mut active, mut departed) = (0usize, 0usize);
    for employee in employees {
        if employee.is_active_at(as_of) {
            active += 1;
        } else if employee
            .departed_at
            .is_some_and(|left| left > window_start && left <= as_of)
        {
            departed += 1;
        }
    }
    measure::percent(active, active + departed)
}

/// Mean progress over records that have not reached the terminal stage.
pub fn average_progress(enrollments: &[Enrollment<'_>]) -> Measure<f64> {
    measure::mean(
        enrollments
            .iter()
            .filter(|e| !e.record.stage.is_terminal())
            .map(|e| f64::from(e.record.progress)),
    )
}

/// Records that are complete.
pub fn completed_count(enrollments: &[Enrollment<'_>]) -> usize {
    enrollments.iter().filter(|e| e.record.is_complete()).count()
}

/// Complete records whose terminal stage was entered in the calendar month of `now`.
pub fn completed_in_month(enrollments: &[Enrollment<'_>], now: DateTime<Utc>) -> usize {
    enrollments
        .iter()
        .filter(|e| e.record.is_complete())
        .filter_map(|e| e.record.entered(Stage::Excel))
        .filter(|at| at.year() == now.year() && at.month() == now.month() && *at <= now)
        .count()
}

/// Mean whole days from first stage to reaching Excel.
pub fn time_to_productivity(enrollments: &[Enrollment<'_>]) -> Measure<f64> {
    measure::mean(enrollments.iter().filter_map(|e| {
        let start = e.record.started_at()?;
        let reached = e.record.entered(Stage::Excel)?;
        Some((reached - start).num_days().max(0) as f64)
    }))
}

/// Mean whole days in program as of `now`. Records without history are skipped.
pub fn average_days_in_program(enrollments: &[Enrollment<'_>], now: DateTime<Utc>) -> Measure<f64> {
    measure::mean(
        enrollments
            .iter()
            .filter_map(|e| e.record.days_in_program(now).ok())
            .map(|d| d as f64),
    )
}

/// Completed tasks as a whole percentage of all tasks.
pub fn task_completion_rate<'a, I>(tasks: I) -> Measure<u8>
where
    I: IntoIterator<Item = &'a Task>,
{
    let (done, total) = tasks
        .into_iter()
        .fold((0, 0), |(done, total), t| (done + usize::from(t.completed), total + 1));
    measure::percent(done, total)
}

/// Completed evaluations as a whole percentage of all evaluations.
pub fn evaluation_completion_rate<'a, I>(evaluations: I) -> Measure<u8>
where
    I: IntoIterator<Item = &'a Evaluation>,
{
    let (done, total) = evaluations
        .into_iter()
        .fold((0, 0), |(done, total), e| (done + usize::from(e.is_completed()), total + 1));
    measure::percent(done, total)
}

/// Mean score of completed surveys that recorded one.
pub fn average_survey_score<'a, I>(evaluations: I) -> Measure<f64>
where
    I: IntoIterator<Item = &'a Evaluation>,
{
    measure::mean(
        evaluations
            .into_iter()
            .filter(|e| e.kind == EvaluationKind::Survey && e.is_completed())
            .filter_map(|e| e.score)
            .map(f64::from),
    )
}
