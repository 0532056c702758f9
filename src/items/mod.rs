//! Transactional items tied to employees: tasks, evaluations, and events.

pub mod due;
pub mod model;

pub use due::{DateProblem, DueDate};
pub use model::{
    Actionable, Evaluation, EvaluationKind, EvaluationStatus, Event, EventKind, Priority, Task,
};
