//! Topic identification for minutes-analytics
//!
//! Topics come from a cascade of tiers tried in a fixed order:
//! LLM (only when asked for), TF-IDF clustering, bigram frequency, and
//! keyword frequency. The first tier that produces topics wins; every tier
//! that was skipped on the way down is recorded in the [`TopicReport`].

mod analyzer;
mod bigram;
mod clustering;
mod enrich;
mod keyword;
mod llm;
mod models;

pub use analyzer::TopicAnalyzer;
pub use models::{
    FallbackKind, Topic, TopicCapabilities, TopicFallback, TopicMethod, TopicReport,
};
