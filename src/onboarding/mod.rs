//! Onboarding domain: people, programs, and the stage lifecycle.
//!
//! Every employee in an early-career program has one `OnboardingRecord`
//! that moves through five ordered stages. Transitions are linear; breaking
//! the order requires an explicit override and leaves an anomalous entry in
//! the record's history.

pub mod model;
pub mod state;

pub use model::{Employee, Program, ProgramType, Role};
pub use state::{OnboardingRecord, Stage, StageEntry, TransitionMode};
