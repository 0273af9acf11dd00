//! Data models for analysis options and results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::config::Settings;
use crate::efficiency::EfficiencyMetrics;
use crate::suggestions::{Suggestion, SuggestionPreferences};
use crate::topics::{Topic, TopicMethod};

/// Per-call analysis options
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Maximum number of topics to return
    pub num_topics: usize,

    /// Ask the oracle for topics and extra suggestions
    pub use_llm: bool,

    pub preferences: SuggestionPreferences,

    /// Earlier metrics to compare against
    pub baseline: Option<EfficiencyMetrics>,

    /// Timeout for each oracle query
    pub oracle_timeout: Duration,

    /// Action/decision phrases from minutes extraction, counted as content markers
    pub external_markers: Vec<String>,
}

impl AnalysisOptions {
    /// Options from the `[analysis]` section of the settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            num_topics: settings.analysis.num_topics,
            use_llm: settings.analysis.use_llm,
            preferences: SuggestionPreferences::default(),
            baseline: None,
            oracle_timeout: settings.oracle_timeout(),
            external_markers: Vec::new(),
        }
    }

    pub fn with_num_topics(mut self, num_topics: usize) -> Self {
        self.num_topics = num_topics;
        self
    }

    pub fn with_llm(mut self, use_llm: bool) -> Self {
        self.use_llm = use_llm;
        self
    }

    pub fn with_preferences(mut self, preferences: SuggestionPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_baseline(mut self, baseline: EfficiencyMetrics) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    pub fn with_external_markers(mut self, markers: Vec<String>) -> Self {
        self.external_markers = markers;
        self
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Sub-analyzers tracked in the status map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Topics,
    Efficiency,
    Suggestions,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Topics, Component::Efficiency, Component::Suggestions];
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Topics => "topics",
            Component::Efficiency => "efficiency",
            Component::Suggestions => "suggestions",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentStatus {
    /// Preferred method succeeded
    Ok,
    /// Succeeded through a fallback
    Degraded,
    /// Broke; its slice of the result is a neutral default
    Failed,
    /// Nothing to do
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentReport {
    pub status: ComponentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentReport {
    pub fn new(status: ComponentStatus, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: Some(detail.into()),
        }
    }

    pub fn ok() -> Self {
        Self {
            status: ComponentStatus::Ok,
            detail: None,
        }
    }
}

/// Everything one `analyze` call produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    /// Sorted by descending relevance
    pub topics: Vec<Topic>,

    pub metrics: EfficiencyMetrics,

    /// Sorted by ascending priority
    pub suggestions: Vec<Suggestion>,

    pub status: BTreeMap<Component, ComponentReport>,

    /// Tier that produced the topics
    pub topic_method: TopicMethod,

    pub generated_at: DateTime<Utc>,
}

impl AnalyticsResult {
    /// Status of one component; a missing entry counts as failed
    pub fn status_of(&self, component: Component) -> ComponentStatus {
        self.status
            .get(&component)
            .map_or(ComponentStatus::Failed, |report| report.status)
    }

    /// True when every component ran its preferred method (or had nothing to do)
    pub fn is_fully_ok(&self) -> bool {
        Component::ALL.iter().all(|c| {
            matches!(
                self.status_of(*c),
                ComponentStatus::Ok | ComponentStatus::Skipped
            )
        })
    }

    pub fn degraded_components(&self) -> Vec<Component> {
        self.components_with(ComponentStatus::Degraded)
    }

    pub fn failed_components(&self) -> Vec<Component> {
        self.components_with(ComponentStatus::Failed)
    }

    fn components_with(&self, status: ComponentStatus) -> Vec<Component> {
        Component::ALL
            .into_iter()
            .filter(|c| self.status_of(*c) == status)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(topics: ComponentStatus) -> AnalyticsResult {
        let mut status = BTreeMap::new();
        status.insert(Component::Topics, ComponentReport::new(topics, "keyword tier"));
        status.insert(Component::Efficiency, ComponentReport::ok());
        status.insert(Component::Suggestions, ComponentReport::ok());

        AnalyticsResult {
            topics: Vec::new(),
            metrics: EfficiencyMetrics::default(),
            suggestions: Vec::new(),
            status,
            topic_method: TopicMethod::Keyword,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn degraded_components_are_listed() {
        let result = result(ComponentStatus::Degraded);
        assert!(!result.is_fully_ok());
        assert_eq!(result.degraded_components(), vec![Component::Topics]);
        assert!(result.failed_components().is_empty());
    }

    #[test]
    fn skipped_counts_as_ok() {
        assert!(result(ComponentStatus::Skipped).is_fully_ok());
    }

    #[test]
    fn status_map_serializes_with_names() {
        let json = serde_json::to_value(result(ComponentStatus::Degraded)).unwrap();
        assert_eq!(json["status"]["topics"]["status"], "degraded");
        assert_eq!(json["status"]["efficiency"]["status"], "ok");
        assert!(json["status"]["efficiency"].get("detail").is_none());
        assert_eq!(json["topic_method"], "keyword");
    }

    #[test]
    fn options_follow_settings() {
        let mut settings = Settings::default();
        settings.analysis.num_topics = 8;
        settings.analysis.oracle_timeout_secs = 5;

        let options = AnalysisOptions::from_settings(&settings);
        assert_eq!(options.num_topics, 8);
        assert_eq!(options.oracle_timeout, Duration::from_secs(5));
        assert!(options.baseline.is_none());
    }
}
