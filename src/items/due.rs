//! Due dates as they arrive from upstream systems.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A due or start date in one of the accepted shapes.
///
/// Anything that is not a recognizable date is kept verbatim in `Malformed`
/// so a single bad row never fails the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DueDate {
    /// RFC 3339 timestamp.
    At(DateTime<Utc>),
    /// `YYYY-MM-DDTHH:MM:SS` without offset, read as UTC.
    Local(NaiveDateTime),
    /// `YYYY-MM-DD`, read as midnight UTC.
    Day(NaiveDate),
    Malformed(serde_json::Value),
}

impl DueDate {
    /// The instant this date denotes, or `None` when malformed.
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::At(at) => Some(*at),
            Self::Local(naive) => Some(naive.and_utc()),
            Self::Day(day) => day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            Self::Malformed(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for DueDate {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

impl From<NaiveDate> for DueDate {
    fn from(day: NaiveDate) -> Self {
        Self::Day(day)
    }
}

/// Why a date could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateProblem {
    Missing,
    Malformed(String),
}

/// Resolve an optional date, distinguishing missing from malformed.
pub fn resolve(due: Option<&DueDate>) -> Result<DateTime<Utc>, DateProblem> {
    match due {
        None => Err(DateProblem::Missing),
        Some(d) => d.resolve().ok_or_else(|| match d {
            DueDate::Malformed(raw) => DateProblem::Malformed(raw.to_string()),
            _ => DateProblem::Malformed(format!("{d:?}")),
        }),
    }
}
