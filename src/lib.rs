//! minutes-analytics - Meeting analytics for minutes
//!
//! Turns a normalized meeting transcript into discussion topics, efficiency
//! metrics, and ranked improvement suggestions. The LLM backend is optional:
//! every analyzer has a deterministic path that works without it.

pub mod analytics;
pub mod config;
pub mod efficiency;
pub mod logging;
pub mod oracle;
pub mod suggestions;
pub mod text;
pub mod topics;
pub mod transcript;

use std::time::Duration;

use thiserror::Error;

pub use analytics::{
    AnalysisOptions, AnalyticsResult, Component, ComponentReport, ComponentStatus,
    MeetingAnalytics,
};
pub use config::Settings;
pub use efficiency::{
    Comparison, DurationSource, EfficiencyAnalyzer, EfficiencyMetrics, EfficiencyRating,
    EfficiencyReport,
};
pub use oracle::{build_oracle, Oracle};
pub use suggestions::{
    Suggestion, SuggestionCategory, SuggestionGenerator, SuggestionPreferences, SuggestionReport,
    SuggestionSource,
};
pub use topics::{Topic, TopicAnalyzer, TopicCapabilities, TopicMethod, TopicReport};
pub use transcript::{Transcript, Utterance};

/// Main error type for minutes-analytics
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Oracle timed out after {0:?}")]
    OracleTimeout(Duration),

    #[error("Component error: {0}")]
    Component(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = "minutes-analytics";
