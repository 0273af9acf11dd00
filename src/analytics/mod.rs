//! Orchestration for minutes-analytics
//!
//! Runs topic and efficiency analysis side by side, feeds both into the
//! suggestion generator, and records per-component status so callers can
//! tell a clean result from a degraded one.

mod engine;
mod models;

pub use engine::MeetingAnalytics;
pub use models::{AnalysisOptions, AnalyticsResult, Component, ComponentReport, ComponentStatus};
