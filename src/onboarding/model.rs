//! People and program data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ViewError;

/// The role a person holds, which also selects the dashboard they see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Supervisor,
    Manager,
    Hr,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Employee, Role::Supervisor, Role::Manager, Role::Hr];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Employee => "employee",
            Self::Supervisor => "supervisor",
            Self::Manager => "manager",
            Self::Hr => "hr",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "supervisor" => Ok(Self::Supervisor),
            "manager" => Ok(Self::Manager),
            "hr" => Ok(Self::Hr),
            _ => Err(ViewError::UnknownRole(s.to_string())),
        }
    }
}

/// Early-career program an employee is enrolled in.
///
/// Variant order is the canonical display order and drives `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgramType {
    #[serde(alias = "INKOMPASS")]
    Inkompass,
    EarlyTalent,
    Apprenticeship,
    AcademicPlacement,
    WorkExperience,
}

impl ProgramType {
    /// All programs in canonical order.
    pub const ALL: [ProgramType; 5] = [
        ProgramType::Inkompass,
        ProgramType::EarlyTalent,
        ProgramType::Apprenticeship,
        ProgramType::AcademicPlacement,
        ProgramType::WorkExperience,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inkompass => "INKOMPASS",
            Self::EarlyTalent => "Early Talent",
            Self::Apprenticeship => "Apprenticeship",
            Self::AcademicPlacement => "Academic Placement",
            Self::WorkExperience => "Work Experience",
        }
    }
}

impl std::fmt::Display for ProgramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference data for a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub program: ProgramType,
    /// Overrides the canonical label when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Expected number of days from first stage to completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_days: Option<u32>,
}

impl Program {
    pub fn new(program: ProgramType) -> Self {
        Self {
            program,
            display_name: None,
            expected_days: None,
        }
    }

    pub fn with_expected_days(mut self, days: u32) -> Self {
        self.expected_days = Some(days);
        self
    }

    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.program.label())
    }
}

/// A person in the organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Stable identity.
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Program enrollment; staff outside the early-career programs have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramType>,
    /// Weak reference to the direct supervisor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_id: Option<String>,
    pub hire_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    /// Set once the employee has left the organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departed_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        hire_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            program: None,
            supervisor_id: None,
            hire_date,
            job_title: None,
            departed_at: None,
        }
    }

    /// Builder: set program.
    pub fn with_program(mut self, program: ProgramType) -> Self {
        self.program = Some(program);
        self
    }

    /// Builder: set supervisor.
    pub fn with_supervisor(mut self, supervisor_id: impl Into<String>) -> Self {
        self.supervisor_id = Some(supervisor_id.into());
        self
    }

    /// Builder: set job title.
    pub fn with_job_title(mut self, title: impl Into<String>) -> Self {
        self.job_title = Some(title.into());
        self
    }

    /// Builder: mark as departed.
    pub fn with_departure(mut self, at: DateTime<Utc>) -> Self {
        self.departed_at = Some(at);
        self
    }

    /// Hired on or before `at` and not departed by then.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.hire_date <= at.date_naive() && !self.has_left_by(at)
    }

    /// Departed on or before `at`. Future hires have not left.
    pub fn has_left_by(&self, at: DateTime<Utc>) -> bool {
        self.departed_at.is_some_and(|d| d <= at)
    }
}
