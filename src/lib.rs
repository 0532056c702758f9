//! Onboarding views: role-based aggregation over an onboarding snapshot.

pub mod anomaly;
pub mod attention;
pub mod clock;
pub mod config;
pub mod error;
pub mod items;
pub mod measure;
pub mod metrics;
pub mod onboarding;
pub mod service;
pub mod snapshot;
pub mod views;
