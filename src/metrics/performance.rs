//! Manager performance metrics judged against configured targets.

use serde::{Deserialize, Serialize};

use crate::config::MetricTargets;
use crate::measure::Measure;

/// Which metric a row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    TrainingCompletion,
    OnboardingSatisfaction,
    TimeToProductivity,
    RetentionRate,
}

impl MetricCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TrainingCompletion => "Training Completion",
            Self::OnboardingSatisfaction => "Onboarding Satisfaction",
            Self::TimeToProductivity => "Time to Productivity",
            Self::RetentionRate => "Retention Rate",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::TrainingCompletion | Self::RetentionRate => "%",
            Self::OnboardingSatisfaction => "/5",
            Self::TimeToProductivity => "days",
        }
    }

    fn higher_is_better(&self) -> bool {
        !matches!(self, Self::TimeToProductivity)
    }
}

/// How a value compares with its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    OnTarget,
    /// Within 10% of the target.
    NearTarget,
    BelowTarget,
    Unavailable,
}

/// Tolerance for `NearTarget`.
const NEAR_TARGET_RATIO: f64 = 0.1;

/// One performance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub category: MetricCategory,
    pub label: String,
    pub value: Measure<f64>,
    pub target: f64,
    pub unit: String,
    pub status: MetricStatus,
}

impl PerformanceMetric {
    pub fn new(category: MetricCategory, value: Measure<f64>, target: f64) -> Self {
        Self {
            category,
            label: category.label().to_string(),
            value,
            target,
            unit: category.unit().to_string(),
            status: assess(value, target, category.higher_is_better()),
        }
    }
}

/// Compare `value` with `target`.
pub fn assess(value: Measure<f64>, target: f64, higher_is_better: bool) -> MetricStatus {
    let Measure::Value(v) = value else {
        return MetricStatus::Unavailable;
    };
    let slack = target * NEAR_TARGET_RATIO;
    if higher_is_better {
        if v >= target {
            MetricStatus::OnTarget
        } else if v >= target - slack {
            MetricStatus::NearTarget
        } else {
            MetricStatus::BelowTarget
        }
    } else if v <= target {
        MetricStatus::OnTarget
    } else if v <= target + slack {
        MetricStatus::NearTarget
    } else {
        MetricStatus::BelowTarget
    }
}

/// Raw values for the performance rows, computed by the caller's scope.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceInputs {
    pub training_completion: Measure<u8>,
    pub satisfaction: Measure<f64>,
    pub time_to_productivity: Measure<f64>,
    pub retention: Measure<u8>,
}

/// The standard performance rows, in display order.
pub fn performance_metrics(inputs: PerformanceInputs, targets: &MetricTargets) -> Vec<PerformanceMetric> {
    vec![
        PerformanceMetric::new(
            MetricCategory::TrainingCompletion,
            inputs.training_completion.map(f64::from),
            targets.training_completion,
        ),
        PerformanceMetric::new(
            MetricCategory::OnboardingSatisfaction,
            inputs.satisfaction,
            targets.satisfaction,
        ),
        PerformanceMetric::new(
            MetricCategory::TimeToProductivity,
            inputs.time_to_productivity,
            targets.time_to_productivity_days,
        ),
        PerformanceMetric::new(
            MetricCategory::RetentionRate,
            inputs.retention.map(f64::from),
            targets.retention,
        ),
    ]
}
