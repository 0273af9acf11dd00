use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::SuggestionSettings;
use crate::efficiency::EfficiencyMetrics;
use crate::oracle::Oracle;
use crate::suggestions::models::{Suggestion, SuggestionPreferences, SuggestionReport};
use crate::suggestions::{llm, roles, rules};
use crate::topics::Topic;

/// Default oracle timeout when none is configured
const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns efficiency metrics (and optionally topics) into ranked suggestions
#[derive(Clone)]
pub struct SuggestionGenerator {
    settings: SuggestionSettings,
    oracle: Option<Arc<dyn Oracle>>,
    oracle_timeout: Duration,
}

impl SuggestionGenerator {
    pub fn new(settings: SuggestionSettings) -> Self {
        Self {
            settings,
            oracle: None,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Ranked suggestions, most important first
    pub async fn generate(
        &self,
        metrics: &EfficiencyMetrics,
        topics: Option<&[Topic]>,
        use_llm: bool,
        preferences: &SuggestionPreferences,
    ) -> Vec<Suggestion> {
        self.generate_report(metrics, topics, use_llm, preferences)
            .await
            .suggestions
    }

    /// Like [`generate`](Self::generate), also reporting how the LLM tier fared.
    /// Oracle problems end up in `llm_error`, never as an error.
    pub async fn generate_report(
        &self,
        metrics: &EfficiencyMetrics,
        topics: Option<&[Topic]>,
        use_llm: bool,
        preferences: &SuggestionPreferences,
    ) -> SuggestionReport {
        let mut report = SuggestionReport {
            suggestions: self.rule_suggestions(metrics, topics),
            ..Default::default()
        };
        debug!("{} rule suggestions fired", report.suggestions.len());

        if use_llm {
            match self.oracle.as_deref() {
                None => report.llm_error = Some("no oracle configured".to_string()),
                Some(oracle) => {
                    match llm::suggest(oracle, metrics, topics, self.oracle_timeout).await {
                        Ok(extra) => {
                            let extra = llm::drop_duplicates(
                                extra,
                                &report.suggestions,
                                self.settings.llm_similarity_threshold,
                            );
                            debug!("{} LLM suggestions kept", extra.len());
                            report.suggestions.extend(extra);
                            report.llm_used = true;
                        }
                        Err(e) => {
                            debug!("LLM suggestions unavailable: {}", e);
                            report.llm_error = Some(e.to_string());
                        }
                    }
                }
            }
        }

        report.suggestions = finalize(report.suggestions, preferences);
        info!("Generated {} suggestions", report.suggestions.len());
        report
    }

    /// Rule-based suggestions only, unfiltered and in rule-table order
    pub fn rule_suggestions(
        &self,
        metrics: &EfficiencyMetrics,
        topics: Option<&[Topic]>,
    ) -> Vec<Suggestion> {
        rules::evaluate(&rules::RuleContext {
            metrics,
            topics,
            settings: &self.settings,
        })
    }
}

/// Filter to preferred categories, rank, truncate, then apply role wording
fn finalize(mut suggestions: Vec<Suggestion>, preferences: &SuggestionPreferences) -> Vec<Suggestion> {
    suggestions.retain(|s| preferences.allows(s.category));

    // Stable: rule-table order and LLM response order break remaining ties
    suggestions.sort_by_key(|s| (s.priority, s.source, s.category));

    if let Some(max) = preferences.max_suggestions {
        suggestions.truncate(max);
    }

    roles::apply_role(&mut suggestions, preferences.role.as_deref());
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::efficiency::DurationSource;
    use crate::suggestions::{SuggestionCategory, SuggestionSource};
    use async_trait::async_trait;

    struct ScriptedOracle(&'static str);

    #[async_trait]
    impl Oracle for ScriptedOracle {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn query(&self, _prompt: &str, _timeout: Duration) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct DownOracle;

    #[async_trait]
    impl Oracle for DownOracle {
        fn name(&self) -> &str {
            "down"
        }

        async fn query(&self, _prompt: &str, _timeout: Duration) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    /// Scenario-like metrics: slow measured pace and two deadlines
    fn metrics() -> EfficiencyMetrics {
        EfficiencyMetrics {
            word_count: 20,
            sentence_count: 3,
            speaker_turn_count: 3,
            speaker_count: 2,
            estimated_duration_secs: 25.0,
            duration_source: DurationSource::Measured,
            words_per_minute: 48.0,
            participation_balance: 0.7,
            engagement_score: 88.0,
            content_density: 1.0,
            action_item_count: 3,
            decision_count: 1,
            deadline_mentions: vec!["Friday".to_string(), "Monday".to_string()],
            ..Default::default()
        }
    }

    fn generator() -> SuggestionGenerator {
        SuggestionGenerator::new(SuggestionSettings::default())
    }

    #[tokio::test]
    async fn rules_sorted_by_priority() {
        let suggestions = generator()
            .generate(&metrics(), None, false, &SuggestionPreferences::default())
            .await;

        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.windows(2).all(|w| w[0].priority <= w[1].priority));
        assert!(suggestions[0].text.contains("Friday"));
    }

    #[tokio::test]
    async fn category_filter_and_cap() {
        let preferences = SuggestionPreferences::only([SuggestionCategory::TimeManagement])
            .with_max_suggestions(1);
        let suggestions = generator().generate(&metrics(), None, false, &preferences).await;
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category, SuggestionCategory::TimeManagement);

        let content_only = SuggestionPreferences::only([SuggestionCategory::Content]);
        assert!(generator()
            .generate(&metrics(), None, false, &content_only)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn llm_suggestions_are_additive() {
        let oracle = Arc::new(ScriptedOracle(
            r#"Here you go: {"suggestions": [{"category": "structure", "text": "Share a written agenda a day ahead.", "reasoning": "Short meeting.", "priority": 3}]}"#,
        ));
        let report = generator()
            .with_oracle(oracle)
            .generate_report(&metrics(), None, true, &SuggestionPreferences::default())
            .await;

        assert!(report.llm_used);
        assert!(report.llm_error.is_none());
        assert_eq!(report.suggestions.len(), 3);
        assert_eq!(report.suggestions[2].source, SuggestionSource::Llm);
    }

    #[tokio::test]
    async fn oracle_failure_is_swallowed() {
        let report = generator()
            .with_oracle(Arc::new(DownOracle))
            .generate_report(&metrics(), None, true, &SuggestionPreferences::default())
            .await;

        assert!(!report.llm_used);
        assert!(report.llm_error.unwrap().contains("connection refused"));
        assert_eq!(report.suggestions.len(), 2);
    }

    #[tokio::test]
    async fn role_changes_wording_not_selection() {
        let plain = generator()
            .generate(&metrics(), None, false, &SuggestionPreferences::default())
            .await;
        let managed = generator()
            .generate(
                &metrics(),
                None,
                false,
                &SuggestionPreferences::default().with_role("manager"),
            )
            .await;

        assert_eq!(plain.len(), managed.len());
        for (a, b) in plain.iter().zip(&managed) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.priority, b.priority);
            assert!(b.reasoning.contains("As the manager"));
        }
    }
}
