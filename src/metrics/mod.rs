//! Aggregation engine: numeric summaries over a scoped set of enrollments.

pub mod aggregate;
pub mod performance;

pub use aggregate::{
    ProgramShare, average_days_in_program, average_progress, average_survey_score,
    completed_count, completed_in_month, count_by_program, count_by_stage, distribution,
    evaluation_completion_rate, retention_rate, task_completion_rate, time_to_productivity,
};
pub use performance::{
    MetricCategory, MetricStatus, PerformanceInputs, PerformanceMetric, performance_metrics,
};
