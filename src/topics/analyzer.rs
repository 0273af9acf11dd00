use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::TopicSettings;
use crate::oracle::Oracle;
use crate::text::transcript_sentences;
use crate::topics::models::{
    FallbackKind, TierError, TierInput, TierResult, Topic, TopicCapabilities, TopicMethod,
    TopicReport,
};
use crate::topics::{bigram, clustering, enrich, keyword, llm};
use crate::transcript::Transcript;

/// One offline tier of the cascade
type Strategy = fn(&TierInput<'_>) -> TierResult;

/// Offline tiers in cascade order. Keyword frequency never fails, so the
/// cascade always ends with topics (possibly none) from some tier.
const OFFLINE_TIERS: &[(TopicMethod, Strategy)] = &[
    (TopicMethod::Clustering, clustering::extract as Strategy),
    (TopicMethod::Bigram, bigram::extract as Strategy),
    (TopicMethod::Keyword, keyword::extract as Strategy),
];

/// Default oracle timeout when none is configured
const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Extracts ranked topics from a transcript
#[derive(Clone)]
pub struct TopicAnalyzer {
    settings: TopicSettings,
    capabilities: TopicCapabilities,
    oracle: Option<Arc<dyn Oracle>>,
    oracle_timeout: Duration,
}

impl TopicAnalyzer {
    pub fn new(settings: TopicSettings) -> Self {
        Self {
            settings,
            capabilities: TopicCapabilities::default(),
            oracle: None,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_capabilities(mut self, capabilities: TopicCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Topics sorted by descending relevance, at most `num_topics` of them
    pub async fn identify_topics(
        &self,
        transcript: &Transcript,
        num_topics: usize,
        use_llm: bool,
    ) -> Vec<Topic> {
        self.analyze(transcript, num_topics, use_llm).await.topics
    }

    /// Run the cascade and report which tier produced the topics.
    ///
    /// Never fails: an empty transcript (or `num_topics == 0`) is reported as
    /// [`TopicMethod::Skipped`], and every tier failure falls through to the
    /// next tier.
    pub async fn analyze(
        &self,
        transcript: &Transcript,
        num_topics: usize,
        use_llm: bool,
    ) -> TopicReport {
        let preferred = if use_llm {
            TopicMethod::Llm
        } else {
            TopicMethod::Clustering
        };

        let sentences = transcript_sentences(transcript);
        if num_topics == 0 || sentences.is_empty() {
            debug!("No content for topic analysis, skipping");
            return TopicReport::skipped(preferred);
        }

        let mut report = TopicReport::skipped(preferred);

        if use_llm {
            let input = TierInput {
                transcript,
                sentences: &sentences,
                num_topics,
                settings: &self.settings,
                capabilities: self.capabilities,
            };
            match llm::extract(&input, self.oracle.as_deref(), self.oracle_timeout).await {
                Ok(candidates) => {
                    report.topics = enrich::enrich(candidates, TopicMethod::Llm, &input);
                    report.method = TopicMethod::Llm;
                    return finish(report);
                }
                Err(e) => record(&mut report, TopicMethod::Llm, e),
            }
        }

        // TF-IDF and k-means are CPU-bound; keep them off the async workers
        let transcript = transcript.clone();
        let settings = self.settings.clone();
        let capabilities = self.capabilities;
        let offline = tokio::task::spawn_blocking(move || {
            let input = TierInput {
                transcript: &transcript,
                sentences: &sentences,
                num_topics,
                settings: &settings,
                capabilities,
            };
            run_offline(report, &input)
        });

        match offline.await {
            Ok(report) => finish(report),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!("Offline topic tiers did not complete: {}", e);
                TopicReport::skipped(preferred)
            }
        }
    }
}

/// Try the offline tiers in order; keyword frequency always ends the cascade
fn run_offline(mut report: TopicReport, input: &TierInput<'_>) -> TopicReport {
    for (method, strategy) in OFFLINE_TIERS {
        match strategy(input) {
            Ok(candidates) if !candidates.is_empty() || *method == TopicMethod::Keyword => {
                report.topics = enrich::enrich(candidates, *method, input);
                report.method = *method;
                return report;
            }
            Ok(_) => record(
                &mut report,
                *method,
                TierError::Insufficient("no candidates".to_string()),
            ),
            Err(e) => record(&mut report, *method, e),
        }
    }

    report.method = TopicMethod::Keyword;
    report
}

fn record(report: &mut TopicReport, method: TopicMethod, error: TierError) {
    let fallback = error.into_fallback(method);
    match fallback.kind {
        FallbackKind::Failed => warn!(
            "Topic tier '{}' failed on valid input, falling back: {}",
            method, fallback.reason
        ),
        FallbackKind::Unavailable | FallbackKind::Insufficient => debug!(
            "Topic tier '{}' skipped ({:?}): {}",
            method, fallback.kind, fallback.reason
        ),
    }
    report.fallbacks.push(fallback);
}

fn finish(report: TopicReport) -> TopicReport {
    info!(
        "Identified {} topics via {} tier{}",
        report.topics.len(),
        report.method,
        if report.is_degraded() { " (degraded)" } else { "" }
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Utterance;
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

    fn scenario() -> Transcript {
        Transcript::new(vec![
            Utterance::new("We need to finalize the Q4 budget by Friday.")
                .spoken_by("A")
                .at(0.0, 10.0),
            Utterance::new("I agree, I will draft the numbers.")
                .spoken_by("B")
                .at(10.0, 20.0),
            Utterance::new("Great, let's review Monday.")
                .spoken_by("A")
                .at(20.0, 25.0),
        ])
    }

    fn analyzer() -> TopicAnalyzer {
        TopicAnalyzer::new(TopicSettings::default())
    }

    #[tokio::test]
    async fn scenario_degrades_to_keywords() {
        let report = analyzer().analyze(&scenario(), 5, false).await;
        assert_eq!(report.method, TopicMethod::Keyword);
        assert!(report.is_degraded());
        assert!(report.topics.len() <= 5);

        let budget = report
            .topics
            .iter()
            .find(|t| t.label.contains("budget") || t.label.contains("q4"))
            .unwrap();
        assert_eq!(budget.key_participants.first().map(String::as_str), Some("A"));
        assert_eq!(budget.method, TopicMethod::Keyword);
    }

    #[tokio::test]
    async fn topics_are_sorted_by_relevance() {
        let transcript = Transcript::new(vec![
            Utterance::new("Budget budget budget hiring hiring roadmap.").spoken_by("A"),
        ]);
        let topics = analyzer().identify_topics(&transcript, 2, false).await;
        assert_eq!(topics.len(), 2);
        assert!(topics[0].relevance_score >= topics[1].relevance_score);
        assert_eq!(topics[0].label, "budget");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn offline_tiers_do_not_hold_the_executor() {
        let utterances = (0..400)
            .map(|i| {
                if i % 2 == 0 {
                    Utterance::new(format!("The hiring pipeline for team {} needs recruiters.", i))
                        .spoken_by("A")
                } else {
                    Utterance::new(format!("The budget forecast for region {} needs cuts.", i))
                        .spoken_by("B")
                }
            })
            .collect();
        let transcript = Transcript::new(utterances);

        // Suspends while clustering runs on the blocking pool instead of
        // finishing inside the first poll
        let first_poll =
            tokio::time::timeout(Duration::ZERO, analyzer().analyze(&transcript, 2, false)).await;
        assert!(first_poll.is_err());

        let report = analyzer().analyze(&transcript, 2, false).await;
        assert!(!report.topics.is_empty());
    }

    #[tokio::test]
    async fn empty_transcript_is_skipped() {
        let report = analyzer().analyze(&Transcript::default(), 5, true).await;
        assert_eq!(report.method, TopicMethod::Skipped);
        assert!(report.topics.is_empty());
        assert!(!report.is_degraded());
    }

    #[tokio::test]
    async fn zero_topics_requested_is_skipped() {
        let report = analyzer().analyze(&scenario(), 0, false).await;
        assert_eq!(report.method, TopicMethod::Skipped);
    }

    #[tokio::test]
    async fn llm_topics_win_when_requested() {
        let oracle = Arc::new(ScriptedOracle(
            r#"{"topics": [{"label": "Q4 budget", "relevance": 0.9, "quotes": ["finalize the Q4 budget by Friday"]}]}"#,
        ));
        let report = analyzer().with_oracle(oracle).analyze(&scenario(), 5, true).await;

        assert_eq!(report.method, TopicMethod::Llm);
        assert!(!report.is_degraded());
        assert_eq!(report.topics[0].label, "Q4 budget");
        assert_eq!(
            report.topics[0].context_sentences,
            vec!["We need to finalize the Q4 budget by Friday."]
        );
    }

    #[tokio::test]
    async fn missing_oracle_falls_back_silently() {
        let report = analyzer().analyze(&scenario(), 5, true).await;
        assert_eq!(report.method, TopicMethod::Keyword);
        assert_eq!(report.fallbacks[0].method, TopicMethod::Llm);
        assert_eq!(report.fallbacks[0].kind, FallbackKind::Unavailable);
    }

    #[tokio::test]
    async fn malformed_oracle_reply_falls_back() {
        let oracle = Arc::new(ScriptedOracle("I could not find any topics, sorry."));
        let report = analyzer().with_oracle(oracle).analyze(&scenario(), 5, true).await;
        assert_eq!(report.method, TopicMethod::Keyword);
        assert!(report.describe().contains("llm"));
    }

    #[tokio::test]
    async fn no_capabilities_reach_keyword_tier() {
        let transcript = Transcript::new(vec![
            Utterance::new("The launch plan slipped.").spoken_by("A"),
            Utterance::new("The launch plan needs owners.").spoken_by("B"),
        ]);
        let report = analyzer()
            .with_capabilities(TopicCapabilities::none())
            .analyze(&transcript, 3, false)
            .await;

        assert_eq!(report.method, TopicMethod::Keyword);
        let kinds: Vec<_> = report.fallbacks.iter().map(|f| (f.method, f.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (TopicMethod::Clustering, FallbackKind::Unavailable),
                (TopicMethod::Bigram, FallbackKind::Unavailable),
            ]
        );
    }
}
