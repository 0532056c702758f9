//! Point-in-time snapshot of onboarding data and its lookup index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::anomaly::{Anomaly, AnomalyKind};
use crate::items::{Evaluation, Event, Task};
use crate::onboarding::{Employee, OnboardingRecord, Program, ProgramType};

/// Immutable input for one view computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub onboarding_records: Vec<OnboardingRecord>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty() && self.onboarding_records.is_empty()
    }

    /// Build a lookup index over this snapshot.
    pub fn index(&self) -> SnapshotIndex<'_> {
        SnapshotIndex::new(self)
    }
}

/// An employee joined with their onboarding record.
#[derive(Debug, Clone, Copy)]
pub struct Enrollment<'a> {
    pub employee: &'a Employee,
    pub record: &'a OnboardingRecord,
}

impl<'a> Enrollment<'a> {
    pub fn program(&self) -> Option<ProgramType> {
        self.employee.program
    }

    pub fn name(&self) -> &'a str {
        &self.employee.name
    }
}

/// Borrowed lookup tables over a snapshot, built once per view build.
pub struct SnapshotIndex<'a> {
    pub snapshot: &'a Snapshot,
    employees: HashMap<&'a str, &'a Employee>,
    records: HashMap<&'a str, &'a OnboardingRecord>,
    programs: HashMap<ProgramType, &'a Program>,
    /// Problems found while joining records to employees.
    pub anomalies: Vec<Anomaly>,
}

impl<'a> SnapshotIndex<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        let employees: HashMap<&str, &Employee> = snapshot
            .employees
            .iter()
            .map(|e| (e.id.as_str(), e))
            .collect();

        let mut anomalies = Vec::new();
        let mut records: HashMap<&str, &OnboardingRecord> = HashMap::new();
        for record in &snapshot.onboarding_records {
            let id = record.employee_id.as_str();
            if !employees.contains_key(id) {
                anomalies.push(Anomaly::new(
                    AnomalyKind::OrphanRecord,
                    id,
                    "onboarding record references an unknown employee",
                ));
                continue;
            }
            if records.contains_key(id) {
                anomalies.push(Anomaly::new(
                    AnomalyKind::DuplicateRecord,
                    id,
                    "more than one onboarding record; the first one is used",
                ));
                continue;
            }
            records.insert(id, record);
        }

        let programs = snapshot.programs.iter().map(|p| (p.program, p)).collect();

        Self {
            snapshot,
            employees,
            records,
            programs,
            anomalies,
        }
    }

    pub fn employee(&self, id: &str) -> Option<&'a Employee> {
        self.employees.get(id).copied()
    }

    pub fn record(&self, employee_id: &str) -> Option<&'a OnboardingRecord> {
        self.records.get(employee_id).copied()
    }

    pub fn program(&self, program: ProgramType) -> Option<&'a Program> {
        self.programs.get(&program).copied()
    }

    /// Display name for an employee id, falling back to the id itself.
    pub fn name_of(&self, id: &str) -> String {
        self.employee(id)
            .map_or_else(|| id.to_string(), |e| e.name.clone())
    }

    /// Enrollments for the given employees, in the order given.
    /// Employees without a record are skipped.
    pub fn enrollments_for<'e, I>(&self, employees: I) -> Vec<Enrollment<'a>>
    where
        I: IntoIterator<Item = &'e Employee>,
    {
        employees
            .into_iter()
            .filter_map(|e| {
                let employee = self.employee(&e.id)?;
                let record = self.record(&e.id)?;
                Some(Enrollment { employee, record })
            })
            .collect()
    }

    /// Every enrollment in snapshot order.
    pub fn all_enrollments(&self) -> Vec<Enrollment<'a>> {
        self.enrollments_for(self.snapshot.employees.iter())
    }
}
