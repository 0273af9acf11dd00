//! Configuration module for minutes-analytics
//!
//! Thresholds, weights, and LLM backend settings, loadable from TOML.

mod settings;

pub use settings::{
    AnalysisSettings, EfficiencySettings, GeneralSettings, LlmSettings, ReportThresholds,
    ScoreWeights, Settings, SuggestionSettings, TopicSettings, API_KEY_ENV,
};
