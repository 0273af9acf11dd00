//! Improvement suggestions for minutes-analytics
//!
//! A fixed table of threshold rules always runs. When asked, the oracle adds
//! free-form suggestions on top; it never replaces the rule output.

mod generator;
mod llm;
mod models;
mod roles;
mod rules;

pub use generator::SuggestionGenerator;
pub use models::{
    Suggestion, SuggestionCategory, SuggestionPreferences, SuggestionReport, SuggestionSource,
};
