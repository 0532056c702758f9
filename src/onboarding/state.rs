//! Onboarding stage engine: lifecycle ordering, transitions, and record checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::anomaly::{Anomaly, AnomalyKind};
use crate::error::StageError;

/// The stages of the onboarding lifecycle.
///
/// Progresses linearly: Prepare → Orient → Land → Integrate → Excel.
/// Variant order is the lifecycle order and drives `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Prepare,
    Orient,
    Land,
    Integrate,
    Excel,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Prepare,
        Stage::Orient,
        Stage::Land,
        Stage::Integrate,
        Stage::Excel,
    ];

    /// Check if a transition from `self` to `target` is valid without override.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        self.next() == Some(target)
    }

    /// Whether this stage is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Excel)
    }

    /// Get the next stage in the linear progression, if any.
    pub fn next(&self) -> Option<Stage> {
        use Stage::*;
        match self {
            Prepare => Some(Orient),
            Orient => Some(Land),
            Land => Some(Integrate),
            Integrate => Some(Excel),
            Excel => None,
        }
    }

    /// Capitalized label, e.g. "Land".
    pub fn label(&self) -> &'static str {
        match self {
            Self::Prepare => "Prepare",
            Self::Orient => "Orient",
            Self::Land => "Land",
            Self::Integrate => "Integrate",
            Self::Excel => "Excel",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Prepare => "prepare",
            Self::Orient => "orient",
            Self::Land => "land",
            Self::Integrate => "integrate",
            Self::Excel => "excel",
        };
        write!(f, "{s}")
    }
}

/// Whether a transition may break the linear order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMode {
    /// Only the immediate successor stage is accepted.
    Standard,
    /// Administrative override: regressions and skips are accepted but the
    /// new history entry is tagged anomalous.
    Override,
}

/// One entry in a record's stage history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEntry {
    pub stage: Stage,
    pub entered_at: DateTime<Utc>,
    /// Set when the entry was created through an administrative override.
    #[serde(default)]
    pub anomalous: bool,
}

/// Onboarding progress for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub employee_id: String,
    /// Current stage; must equal the last history entry.
    pub stage: Stage,
    /// Ordered stage history, oldest first.
    pub history: Vec<StageEntry>,
    /// Overall progress percentage (0–100).
    #[serde(default)]
    pub progress: u8,
    /// Set once progress has changed after an override regression.
    #[serde(default)]
    pub progress_reset_spent: bool,
}

impl OnboardingRecord {
    /// Start a record at `Prepare`.
    pub fn start(employee_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            employee_id: employee_id.into(),
            stage: Stage::Prepare,
            history: vec![StageEntry {
                stage: Stage::Prepare,
                entered_at: at,
                anomalous: false,
            }],
            progress: 0,
            progress_reset_spent: false,
        }
    }

    /// Builder: set progress without validation (for fixtures and intake).
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress;
        self
    }

    /// Move to `target`, returning the updated record.
    ///
    /// Progress is left untouched. The original record is not modified.
    pub fn advance(
        &self,
        target: Stage,
        now: DateTime<Utc>,
        mode: TransitionMode,
    ) -> Result<OnboardingRecord, StageError> {
        self.last_entry()?;

        let anomalous = if self.stage.can_transition_to(target) {
            false
        } else if mode == TransitionMode::Override && target != self.stage {
            true
        } else {
            return Err(StageError::InvalidTransition {
                employee_id: self.employee_id.clone(),
                from: self.stage,
                to: target,
            });
        };

        let mut next = self.clone();
        next.history.push(StageEntry {
            stage: target,
            entered_at: now,
            anomalous,
        });
        next.stage = target;
        next.progress_reset_spent = false;
        Ok(next)
    }

    /// Set progress, returning the updated record.
    ///
    /// Progress may only drop on the first change after an override
    /// regression. Any later change in the same stage must not go down.
    pub fn set_progress(&self, percent: u8) -> Result<OnboardingRecord, StageError> {
        if percent > 100 {
            return Err(StageError::ProgressOutOfRange {
                employee_id: self.employee_id.clone(),
                value: percent,
            });
        }
        let reset_open = self.last_transition_is_regression() && !self.progress_reset_spent;
        if percent < self.progress && !reset_open {
            return Err(StageError::ProgressRegression {
                employee_id: self.employee_id.clone(),
                current: self.progress,
                requested: percent,
            });
        }
        let mut next = self.clone();
        next.progress = percent;
        if reset_open {
            next.progress_reset_spent = true;
        }
        Ok(next)
    }

    /// Whole days since the current stage was entered.
    pub fn days_in_stage(&self, now: DateTime<Utc>) -> Result<i64, StageError> {
        let entry = self.last_entry()?;
        Ok((now - entry.entered_at).num_days().max(0))
    }

    /// Whole days since the first history entry.
    pub fn days_in_program(&self, now: DateTime<Utc>) -> Result<i64, StageError> {
        let first = self.history.first().ok_or_else(|| self.empty_history())?;
        Ok((now - first.entered_at).num_days().max(0))
    }

    /// When the record first entered any stage.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.history.first().map(|e| e.entered_at)
    }

    /// When the current stage was entered.
    pub fn stage_entered_at(&self) -> Option<DateTime<Utc>> {
        self.history.last().map(|e| e.entered_at)
    }

    /// When the record last entered `stage`, if ever.
    pub fn entered(&self, stage: Stage) -> Option<DateTime<Utc>> {
        self.history
            .iter()
            .rev()
            .find(|e| e.stage == stage)
            .map(|e| e.entered_at)
    }

    /// Complete means 100% at the terminal stage.
    pub fn is_complete(&self) -> bool {
        self.stage.is_terminal() && self.progress >= 100
    }

    /// Check the record's invariants, reporting every violation found.
    pub fn validate(&self) -> Vec<Anomaly> {
        let id = &self.employee_id;
        let mut found = Vec::new();

        let Some(last) = self.history.last() else {
            found.push(Anomaly::new(
                AnomalyKind::EmptyHistory,
                id,
                "onboarding record has no stage history",
            ));
            return found;
        };

        if last.stage != self.stage {
            found.push(Anomaly::new(
                AnomalyKind::StageMismatch,
                id,
                format!(
                    "current stage {} does not match last history entry {}",
                    self.stage, last.stage
                ),
            ));
        }

        for pair in self.history.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if cur.entered_at < prev.entered_at {
                found.push(Anomaly::new(
                    AnomalyKind::HistoryOutOfOrder,
                    id,
                    format!("{} entered before {}", cur.stage, prev.stage),
                ));
            }
            if prev.stage.can_transition_to(cur.stage) {
                continue;
            }
            let direction = if cur.stage <= prev.stage {
                "regression"
            } else {
                "skip"
            };
            let kind = match (cur.anomalous, direction) {
                (true, _) => AnomalyKind::AnomalousTransition,
                (false, "regression") => AnomalyKind::UnflaggedRegression,
                (false, _) => AnomalyKind::UnflaggedSkip,
            };
            found.push(Anomaly::new(
                kind,
                id,
                format!("{direction} from {} to {}", prev.stage, cur.stage),
            ));
        }

        if self.progress > 100 {
            found.push(Anomaly::new(
                AnomalyKind::ProgressOutOfRange,
                id,
                format!("progress {}% exceeds 100%", self.progress),
            ));
        }

        found
    }

    fn last_entry(&self) -> Result<&StageEntry, StageError> {
        self.history.last().ok_or_else(|| self.empty_history())
    }

    fn empty_history(&self) -> StageError {
        StageError::EmptyHistory {
            employee_id: self.employee_id.clone(),
        }
    }

    fn last_transition_is_regression(&self) -> bool {
        match self.history.as_slice() {
            [.., prev, last] => last.anomalous && last.stage < prev.stage,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 9, 1, 9, 0, 0).unwrap()
    }

    fn record_at(stage: Stage) -> OnboardingRecord {
        let mut record = OnboardingRecord::start("101", t0());
        let mut at = t0();
        while record.stage != stage {
            at += Duration::days(5);
            let next = record.stage.next().unwrap();
            record = record.advance(next, at, TransitionMode::Standard).unwrap();
        }
        record
    }

    #[test]
    fn valid_transitions() {
        use Stage::*;
        let transitions = [
            (Prepare, Orient),
            (Orient, Land),
            (Land, Integrate),
            (Integrate, Excel),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use Stage::*;
        // Skip
        assert!(!Prepare.can_transition_to(Land));
        // Backward
        assert!(!Land.can_transition_to(Orient));
        // Terminal
        assert!(!Excel.can_transition_to(Prepare));
        // Self-transition
        assert!(!Orient.can_transition_to(Orient));
    }

    #[test]
    fn next_walks_all_stages() {
        let mut current = Stage::Prepare;
        for expected in &Stage::ALL[1..] {
            let next = current.next().unwrap();
            assert_eq!(next, *expected);
            current = next;
        }
        assert!(current.next().is_none());
        assert!(current.is_terminal());
    }

    #[test]
    fn display_matches_serde() {
        for stage in Stage::ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(format!("\"{stage}\""), json, "Display and serde should match for {stage:?}");
        }
    }

    #[test]
    fn advance_appends_history() {
        let record = record_at(Stage::Orient);
        let now = t0() + Duration::days(20);
        let next = record.advance(Stage::Land, now, TransitionMode::Standard).unwrap();

        assert_eq!(next.stage, Stage::Land);
        assert_eq!(next.history.len(), record.history.len() + 1);
        let last = next.history.last().unwrap();
        assert_eq!(last.stage, Stage::Land);
        assert_eq!(last.entered_at, now);
        assert!(!last.anomalous);
        // Input untouched
        assert_eq!(record.stage, Stage::Orient);
    }

    #[test]
    fn advance_leaves_progress_alone() {
        let record = record_at(Stage::Orient).with_progress(40);
        let next = record.advance(Stage::Land, t0() + Duration::days(30), TransitionMode::Standard).unwrap();
        assert_eq!(next.progress, 40);
    }

    #[test]
    fn regression_without_override_fails() {
        let record = record_at(Stage::Land);
        let err = record
            .advance(Stage::Orient, t0() + Duration::days(30), TransitionMode::Standard)
            .unwrap_err();
        assert_eq!(
            err,
            StageError::InvalidTransition {
                employee_id: "101".into(),
                from: Stage::Land,
                to: Stage::Orient,
            }
        );
    }

    #[test]
    fn regression_with_override_is_tagged() {
        let record = record_at(Stage::Land);
        let next = record
            .advance(Stage::Orient, t0() + Duration::days(30), TransitionMode::Override)
            .unwrap();
        assert_eq!(next.stage, Stage::Orient);
        assert!(next.history.last().unwrap().anomalous);

        let anomalies = next.validate();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::AnomalousTransition);
    }

    #[test]
    fn skip_requires_override() {
        let record = record_at(Stage::Orient);
        let now = t0() + Duration::days(30);
        assert!(record.advance(Stage::Excel, now, TransitionMode::Standard).is_err());

        let skipped = record.advance(Stage::Excel, now, TransitionMode::Override).unwrap();
        assert!(skipped.history.last().unwrap().anomalous);
    }

    #[test]
    fn same_stage_rejected_even_with_override() {
        let record = record_at(Stage::Land);
        let now = t0() + Duration::days(30);
        assert!(record.advance(Stage::Land, now, TransitionMode::Override).is_err());
    }

    #[test]
    fn empty_history_is_contract_error() {
        let record = OnboardingRecord {
            employee_id: "9".into(),
            stage: Stage::Land,
            history: Vec::new(),
            progress: 10,
            progress_reset_spent: false,
        };
        let expected = StageError::EmptyHistory { employee_id: "9".into() };
        assert_eq!(record.days_in_stage(t0()).unwrap_err(), expected);
        assert_eq!(record.days_in_program(t0()).unwrap_err(), expected);
        assert_eq!(
            record.advance(Stage::Integrate, t0(), TransitionMode::Standard).unwrap_err(),
            expected
        );
        assert_eq!(record.validate()[0].kind, AnomalyKind::EmptyHistory);
    }

    #[test]
    fn day_counts() {
        let record = record_at(Stage::Land); // entered at t0 + 10d
        let now = t0() + Duration::days(25);
        assert_eq!(record.days_in_stage(now).unwrap(), 15);
        assert_eq!(record.days_in_program(now).unwrap(), 25);
        // A clock behind the history never yields negative days
        assert_eq!(record.days_in_stage(t0()).unwrap(), 0);
    }

    #[test]
    fn progress_cannot_drop_within_stage() {
        let record = record_at(Stage::Land).with_progress(60);
        assert!(record.set_progress(80).is_ok());
        assert_eq!(
            record.set_progress(30).unwrap_err(),
            StageError::ProgressRegression {
                employee_id: "101".into(),
                current: 60,
                requested: 30,
            }
        );
        assert!(matches!(
            record.set_progress(101),
            Err(StageError::ProgressOutOfRange { value: 101, .. })
        ));
    }

    #[test]
    fn progress_may_reset_after_override_regression() {
        let record = record_at(Stage::Land).with_progress(60);
        let regressed = record
            .advance(Stage::Orient, t0() + Duration::days(40), TransitionMode::Override)
            .unwrap();
        let reset = regressed.set_progress(20).unwrap();
        assert_eq!(reset.progress, 20);
    }

    #[test]
    fn progress_reset_is_single_use() {
        let record = record_at(Stage::Land).with_progress(60);
        let regressed = record
            .advance(Stage::Orient, t0() + Duration::days(40), TransitionMode::Override)
            .unwrap();
        let raised = regressed.set_progress(20).unwrap().set_progress(50).unwrap();
        assert_eq!(
            raised.set_progress(5).unwrap_err(),
            StageError::ProgressRegression {
                employee_id: "101".into(),
                current: 50,
                requested: 5,
            }
        );

        // Raising first also spends the reset
        let raised_first = regressed.set_progress(70).unwrap();
        assert!(raised_first.set_progress(10).is_err());

        // A later regression opens a fresh reset
        let again = raised
            .advance(Stage::Land, t0() + Duration::days(45), TransitionMode::Standard)
            .unwrap()
            .advance(Stage::Prepare, t0() + Duration::days(50), TransitionMode::Override)
            .unwrap();
        assert_eq!(again.set_progress(0).unwrap().progress, 0);
    }

    #[test]
    fn spent_reset_survives_serde() {
        let record = record_at(Stage::Land).with_progress(60);
        let spent = record
            .advance(Stage::Orient, t0() + Duration::days(40), TransitionMode::Override)
            .unwrap()
            .set_progress(20)
            .unwrap();
        let json = serde_json::to_string(&spent).unwrap();
        let back: OnboardingRecord = serde_json::from_str(&json).unwrap();
        assert!(back.progress_reset_spent);
        assert!(back.set_progress(10).is_err());
    }

    #[test]
    fn validate_reports_mismatch_and_unflagged_steps() {
        let mut record = record_at(Stage::Orient);
        record.history.push(StageEntry {
            stage: Stage::Integrate,
            entered_at: t0() + Duration::days(2),
            anomalous: false,
        });
        // stage still says Orient, history skipped Land and went back in time
        let kinds: Vec<AnomalyKind> = record.validate().into_iter().map(|a| a.kind).collect();
        assert!(kinds.contains(&AnomalyKind::StageMismatch));
        assert!(kinds.contains(&AnomalyKind::UnflaggedSkip));
        assert!(kinds.contains(&AnomalyKind::HistoryOutOfOrder));
    }

    #[test]
    fn complete_requires_full_progress_at_excel() {
        let record = record_at(Stage::Excel);
        assert!(!record.clone().with_progress(95).is_complete());
        assert!(record.with_progress(100).is_complete());
        assert!(!record_at(Stage::Integrate).with_progress(100).is_complete());
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = record_at(Stage::Integrate).with_progress(85);
        let json = serde_json::to_string(&record).unwrap();
        let parsed: OnboardingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
