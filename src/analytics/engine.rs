use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{info, warn};

use crate::analytics::models::{
    AnalysisOptions, AnalyticsResult, Component, ComponentReport, ComponentStatus,
};
use crate::config::Settings;
use crate::efficiency::{EfficiencyAnalyzer, EfficiencyMetrics};
use crate::oracle::{build_oracle, Oracle};
use crate::suggestions::{SuggestionGenerator, SuggestionReport};
use crate::topics::{TopicAnalyzer, TopicCapabilities, TopicMethod, TopicReport};
use crate::transcript::Transcript;
use crate::{AnalyticsError, Result};

/// Output of one parallel branch
enum Branch {
    Topics(TopicReport),
    Efficiency(Result<EfficiencyMetrics>),
}

/// Everything the parallel branches left behind
#[derive(Default)]
struct Joined {
    topics: Option<TopicReport>,
    metrics: Option<Result<EfficiencyMetrics>>,
    /// Crash description per task that did not finish
    crashes: HashMap<Id, String>,
}

/// Runs every analyzer over a transcript and assembles one result.
///
/// Sub-analyzer failures never escape `analyze`: they are recorded in the
/// status map and replaced with neutral defaults. Only an invalid transcript
/// is reported as an error.
#[derive(Clone)]
pub struct MeetingAnalytics {
    settings: Settings,
    oracle: Option<Arc<dyn Oracle>>,
    capabilities: TopicCapabilities,
}

impl MeetingAnalytics {
    /// Analytics without an oracle
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            oracle: None,
            capabilities: TopicCapabilities::default(),
        }
    }

    /// Analytics with the oracle configured in `[llm]`, if any
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let oracle = build_oracle(&settings.llm)
            .map_err(|e| AnalyticsError::Config(format!("{:#}", e)))?;

        let analytics = Self::new(settings);
        Ok(match oracle {
            Some(oracle) => analytics.with_oracle(oracle),
            None => analytics,
        })
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_capabilities(mut self, capabilities: TopicCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Analyze one transcript.
    ///
    /// Topics and efficiency run concurrently; suggestions follow once both
    /// are done. Dropping the returned future aborts all in-flight work,
    /// including pending oracle queries.
    pub async fn analyze(
        &self,
        transcript: &Transcript,
        options: &AnalysisOptions,
    ) -> Result<AnalyticsResult> {
        transcript.validate()?;

        info!(
            "Analyzing transcript: {} utterances, {} topics requested, llm {}",
            transcript.len(),
            options.num_topics,
            if options.use_llm { "on" } else { "off" }
        );

        let shared = Arc::new(transcript.clone());
        let mut branches: JoinSet<Branch> = JoinSet::new();

        let topic_analyzer = self.topic_analyzer(options);
        let (num_topics, use_llm) = (options.num_topics, options.use_llm);
        let topic_transcript = Arc::clone(&shared);
        let topics_task = branches
            .spawn(async move {
                Branch::Topics(
                    topic_analyzer
                        .analyze(&topic_transcript, num_topics, use_llm)
                        .await,
                )
            })
            .id();

        let efficiency = EfficiencyAnalyzer::new(self.settings.efficiency.clone());
        let baseline = options.baseline.clone();
        let markers = options.external_markers.clone();
        let efficiency_transcript = Arc::clone(&shared);
        let efficiency_task = branches
            .spawn_blocking(move || {
                Branch::Efficiency(efficiency.analyze_with_markers(
                    &efficiency_transcript,
                    baseline.as_ref(),
                    &markers,
                ))
            })
            .id();

        let Joined {
            topics: topic_report,
            metrics,
            crashes,
        } = join_branches(branches).await;

        let mut status = BTreeMap::new();

        let (topics, topic_method) = match topic_report {
            Some(report) => {
                status.insert(Component::Topics, topic_status(&report));
                (Some(report.topics), report.method)
            }
            None => {
                let detail = crash_detail(&crashes, topics_task, "topic analysis");
                warn!("Topic analysis failed: {}", detail);
                status.insert(
                    Component::Topics,
                    ComponentReport::new(ComponentStatus::Failed, detail),
                );
                (None, TopicMethod::Skipped)
            }
        };

        let metrics = match metrics {
            Some(Ok(metrics)) => {
                status.insert(Component::Efficiency, ComponentReport::ok());
                Some(metrics)
            }
            Some(Err(e)) => {
                warn!("Efficiency analysis failed: {}", e);
                status.insert(
                    Component::Efficiency,
                    ComponentReport::new(ComponentStatus::Failed, e.to_string()),
                );
                None
            }
            None => {
                let detail = crash_detail(&crashes, efficiency_task, "efficiency analysis");
                warn!("Efficiency analysis failed: {}", detail);
                status.insert(
                    Component::Efficiency,
                    ComponentReport::new(ComponentStatus::Failed, detail),
                );
                None
            }
        };

        let suggestions = match &metrics {
            None => {
                status.insert(
                    Component::Suggestions,
                    ComponentReport::new(
                        ComponentStatus::Skipped,
                        "efficiency metrics unavailable",
                    ),
                );
                Vec::new()
            }
            Some(metrics) => {
                let (report, suggestion_status) =
                    self.run_suggestions(metrics, topics.as_deref(), options).await;
                status.insert(Component::Suggestions, suggestion_status);
                report.map(|r| r.suggestions).unwrap_or_default()
            }
        };

        let result = AnalyticsResult {
            topics: topics.unwrap_or_default(),
            metrics: metrics.unwrap_or_default(),
            suggestions,
            status,
            topic_method,
            generated_at: Utc::now(),
        };

        info!(
            "Analysis complete: {} topics via {}, {} suggestions, degraded: {:?}, failed: {:?}",
            result.topics.len(),
            result.topic_method,
            result.suggestions.len(),
            result.degraded_components(),
            result.failed_components()
        );

        Ok(result)
    }

    fn topic_analyzer(&self, options: &AnalysisOptions) -> TopicAnalyzer {
        let analyzer = TopicAnalyzer::new(self.settings.topics.clone())
            .with_capabilities(self.capabilities)
            .with_oracle_timeout(options.oracle_timeout);

        match &self.oracle {
            Some(oracle) => analyzer.with_oracle(Arc::clone(oracle)),
            None => analyzer,
        }
    }

    fn suggestion_generator(&self, options: &AnalysisOptions) -> SuggestionGenerator {
        let generator = SuggestionGenerator::new(self.settings.suggestions.clone())
            .with_oracle_timeout(options.oracle_timeout);

        match &self.oracle {
            Some(oracle) => generator.with_oracle(Arc::clone(oracle)),
            None => generator,
        }
    }

    /// Generate suggestions in their own task so a panic there stays contained
    async fn run_suggestions(
        &self,
        metrics: &EfficiencyMetrics,
        topics: Option<&[crate::topics::Topic]>,
        options: &AnalysisOptions,
    ) -> (Option<SuggestionReport>, ComponentReport) {
        let generator = self.suggestion_generator(options);
        let metrics = metrics.clone();
        let topics = topics.map(<[_]>::to_vec);
        let preferences = options.preferences.clone();
        let use_llm = options.use_llm;

        let mut task: JoinSet<SuggestionReport> = JoinSet::new();
        task.spawn(async move {
            generator
                .generate_report(&metrics, topics.as_deref(), use_llm, &preferences)
                .await
        });

        match task.join_next().await {
            Some(Ok(report)) => {
                let status = match (&report.llm_error, use_llm) {
                    (Some(error), true) => ComponentReport::new(
                        ComponentStatus::Degraded,
                        format!("rule-based only, LLM unavailable: {}", error),
                    ),
                    _ => ComponentReport::ok(),
                };
                (Some(report), status)
            }
            Some(Err(e)) => {
                let detail = format!("suggestion generation {}", describe_crash(e));
                warn!("{}", detail);
                (None, ComponentReport::new(ComponentStatus::Failed, detail))
            }
            None => (
                None,
                ComponentReport::new(ComponentStatus::Failed, "suggestion task never ran"),
            ),
        }
    }
}

fn topic_status(report: &TopicReport) -> ComponentReport {
    let status = if report.method == TopicMethod::Skipped {
        ComponentStatus::Skipped
    } else if report.is_degraded() {
        ComponentStatus::Degraded
    } else {
        ComponentStatus::Ok
    };
    ComponentReport::new(status, report.describe())
}

async fn join_branches(mut branches: JoinSet<Branch>) -> Joined {
    let mut joined = Joined::default();

    while let Some(result) = branches.join_next().await {
        match result {
            Ok(Branch::Topics(report)) => joined.topics = Some(report),
            Ok(Branch::Efficiency(result)) => joined.metrics = Some(result),
            Err(e) => {
                let id = e.id();
                joined.crashes.insert(id, describe_crash(e));
            }
        }
    }

    joined
}

/// "panicked: <message>" for panics, the join error otherwise
fn describe_crash(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }

    let payload = error.into_panic();
    let message = match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|message| message.to_string())
            .unwrap_or_else(|| "unknown panic".to_string()),
    };
    format!("panicked: {}", message)
}

/// Status detail of one branch, naming only that branch's own crash
fn crash_detail(crashes: &HashMap<Id, String>, task: Id, what: &str) -> String {
    match crashes.get(&task) {
        Some(crash) => format!("{} crashed: {}", what, crash),
        None => format!("{} did not complete", what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Utterance;

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

    #[tokio::test]
    async fn every_component_has_a_status() {
        let analytics = MeetingAnalytics::new(Settings::default());
        let result = analytics
            .analyze(&scenario(), &AnalysisOptions::default())
            .await
            .unwrap();

        for component in Component::ALL {
            assert!(result.status.contains_key(&component));
        }
        assert_eq!(result.status_of(Component::Efficiency), ComponentStatus::Ok);
        assert_eq!(result.status_of(Component::Topics), ComponentStatus::Degraded);
        assert_eq!(result.topic_method, TopicMethod::Keyword);
    }

    #[tokio::test]
    async fn invalid_transcript_is_the_only_error() {
        let analytics = MeetingAnalytics::new(Settings::default());
        let transcript = Transcript::new(vec![Utterance::new("backwards").at(5.0, 1.0)]);

        let err = analytics
            .analyze(&transcript, &AnalysisOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidTranscript(_)));
    }

    #[tokio::test]
    async fn failed_efficiency_skips_suggestions() {
        let mut settings = Settings::default();
        settings.efficiency.engagement_turn_weight = f64::NAN;
        let analytics = MeetingAnalytics::new(settings);

        let result = analytics
            .analyze(&scenario(), &AnalysisOptions::default())
            .await
            .unwrap();

        assert_eq!(result.status_of(Component::Efficiency), ComponentStatus::Failed);
        assert_eq!(result.status_of(Component::Suggestions), ComponentStatus::Skipped);
        assert_eq!(result.metrics, EfficiencyMetrics::default());
        assert!(result.suggestions.is_empty());
        assert!(!result.topics.is_empty());
    }

    #[tokio::test]
    async fn each_crash_is_reported_against_its_own_branch() {
        fn tokenizer_bug() -> Branch {
            panic!("tokenizer exploded")
        }
        fn ratio_bug(field: &str) -> Branch {
            panic!("ratio overflow in {}", field)
        }

        let mut branches: JoinSet<Branch> = JoinSet::new();
        let topics_task = branches.spawn(async { tokenizer_bug() }).id();
        let efficiency_task = branches.spawn_blocking(|| ratio_bug("shares")).id();

        let joined = join_branches(branches).await;
        assert!(joined.topics.is_none());
        assert!(joined.metrics.is_none());

        let topics = crash_detail(&joined.crashes, topics_task, "topic analysis");
        assert_eq!(topics, "topic analysis crashed: panicked: tokenizer exploded");

        let efficiency = crash_detail(&joined.crashes, efficiency_task, "efficiency analysis");
        assert_eq!(
            efficiency,
            "efficiency analysis crashed: panicked: ratio overflow in shares"
        );
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let mut settings = Settings::default();
        settings.llm.provider = "carrier-pigeon".to_string();
        assert!(matches!(
            MeetingAnalytics::from_settings(settings),
            Err(AnalyticsError::Config(_))
        ));
    }
}
