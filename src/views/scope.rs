//! Who a supervisor or manager can see.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::anomaly::{Anomaly, AnomalyKind};
use crate::onboarding::Employee;
use crate::snapshot::Snapshot;

/// Employees whose supervisor is `supervisor_id`, in snapshot order.
pub fn direct_reports<'a>(snapshot: &'a Snapshot, supervisor_id: &str) -> Vec<&'a Employee> {
    snapshot
        .employees
        .iter()
        .filter(|e| e.id != supervisor_id && e.supervisor_id.as_deref() == Some(supervisor_id))
        .collect()
}

/// Everyone below `manager_id` in the reporting tree, breadth first.
///
/// The root is never part of its own subtree. A reporting line that leads back
/// to someone already visited is reported as a cycle and not followed.
pub fn subtree<'a>(snapshot: &'a Snapshot, manager_id: &str) -> (Vec<&'a Employee>, Vec<Anomaly>) {
    let mut children: HashMap<&str, Vec<&Employee>> = HashMap::new();
    for employee in &snapshot.employees {
        if let Some(supervisor) = employee.supervisor_id.as_deref() {
            children.entry(supervisor).or_default().push(employee);
        }
    }

    let mut visited: HashSet<&str> = HashSet::from([manager_id]);
    let mut queue: VecDeque<&str> = VecDeque::from([manager_id]);
    let mut members = Vec::new();
    let mut anomalies = Vec::new();

    while let Some(current) = queue.pop_front() {
        for &child in children.get(current).map(Vec::as_slice).unwrap_or_default() {
            if !visited.insert(child.id.as_str()) {
                anomalies.push(Anomaly::new(
                    AnomalyKind::SupervisorCycle,
                    &child.id,
                    format!("reporting line through {current} leads back to {}", child.id),
                ));
                continue;
            }
            members.push(child);
            queue.push_back(child.id.as_str());
        }
    }

    debug!(manager_id, members = members.len(), cycles = anomalies.len(), "Resolved reporting subtree");
    (members, anomalies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::onboarding::Role;

    fn person(id: &str, supervisor: Option<&str>) -> Employee {
        let e = Employee::new(id, id, Role::Employee, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        match supervisor {
            Some(s) => e.with_supervisor(s),
            None => e,
        }
    }

    fn ids(employees: &[&Employee]) -> Vec<String> {
        employees.iter().map(|e| e.id.clone()).collect()
    }

    fn org() -> Snapshot {
        Snapshot {
            employees: vec![
                person("m", None),
                person("s1", Some("m")),
                person("s2", Some("m")),
                person("a", Some("s1")),
                person("b", Some("s1")),
                person("c", Some("s2")),
                person("x", None),
            ],
            ..Snapshot::default()
        }
    }

    #[test]
    fn direct_reports_are_one_level() {
        let s = org();
        assert_eq!(ids(&direct_reports(&s, "s1")), vec!["a", "b"]);
        assert_eq!(ids(&direct_reports(&s, "m")), vec!["s1", "s2"]);
        assert!(direct_reports(&s, "a").is_empty());
    }

    #[test]
    fn subtree_is_transitive() {
        let s = org();
        let (members, anomalies) = subtree(&s, "m");
        assert_eq!(ids(&members), vec!["s1", "s2", "a", "b", "c"]);
        assert!(anomalies.is_empty());
    }

    #[test]
    fn cycle_is_reported_and_terminates() {
        let s = Snapshot {
            employees: vec![person("m", Some("b")), person("a", Some("m")), person("b", Some("a"))],
            ..Snapshot::default()
        };
        let (members, anomalies) = subtree(&s, "m");
        assert_eq!(ids(&members), vec!["a", "b"]);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::SupervisorCycle);
        assert_eq!(anomalies[0].subject, "m");
    }

    #[test]
    fn self_supervision_is_a_cycle() {
        let s = Snapshot {
            employees: vec![person("m", Some("m"))],
            ..Snapshot::default()
        };
        let (members, anomalies) = subtree(&s, "m");
        assert!(members.is_empty());
        assert_eq!(anomalies.len(), 1);
        assert!(direct_reports(&s, "m").is_empty());
    }
}
