//! Analytics settings management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that supplies the LLM API key when the file has none
pub const API_KEY_ENV: &str = "MINUTES_ANALYTICS_LLM_API_KEY";

/// Main analytics settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Per-call defaults for `analyze`
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// Topic extraction settings
    #[serde(default)]
    pub topics: TopicSettings,

    /// Efficiency metric settings
    #[serde(default)]
    pub efficiency: EfficiencySettings,

    /// Suggestion rule thresholds
    #[serde(default)]
    pub suggestions: SuggestionSettings,

    /// LLM oracle settings
    #[serde(default)]
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Maximum number of topics to return
    #[serde(default = "default_num_topics")]
    pub num_topics: usize,

    /// Ask the LLM oracle for topics and extra suggestions
    #[serde(default)]
    pub use_llm: bool,

    /// Timeout for a single oracle query, in seconds
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSettings {
    /// Context sentences kept per topic
    #[serde(default = "default_max_context_sentences")]
    pub max_context_sentences: usize,

    /// Key participants kept per topic
    #[serde(default = "default_max_key_participants")]
    pub max_key_participants: usize,

    /// Minimum context overlap (Jaccard) for two topics to be related
    #[serde(default = "default_related_threshold")]
    pub related_threshold: f64,

    /// Minimum occurrences before a bigram is a topic candidate
    #[serde(default = "default_bigram_min_frequency")]
    pub bigram_min_frequency: usize,

    /// Vocabulary size for TF-IDF vectors
    #[serde(default = "default_tfidf_max_features")]
    pub tfidf_max_features: usize,

    /// Upper bound on k-means iterations
    #[serde(default = "default_kmeans_max_iterations")]
    pub kmeans_max_iterations: usize,
}

/// Weights of the overall efficiency score; normalized by their sum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_pace_weight")]
    pub pace: f64,

    #[serde(default = "default_balance_weight")]
    pub balance: f64,

    #[serde(default = "default_engagement_weight")]
    pub engagement: f64,

    #[serde(default = "default_content_weight")]
    pub content: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencySettings {
    /// Speaking rate used to estimate duration when there are no timestamps
    #[serde(default = "default_assumed_wpm")]
    pub assumed_words_per_minute: f64,

    /// Lower edge of the ideal pace band
    #[serde(default = "default_target_wpm_low")]
    pub target_wpm_low: f64,

    /// Upper edge of the ideal pace band
    #[serde(default = "default_target_wpm_high")]
    pub target_wpm_high: f64,

    /// Average turn length (words) at or below which turn frequency scores full marks
    #[serde(default = "default_target_words_per_turn")]
    pub target_words_per_turn: f64,

    /// Share of engagement driven by turn frequency
    #[serde(default = "default_engagement_turn_weight")]
    pub engagement_turn_weight: f64,

    /// Share of engagement driven by participation balance
    #[serde(default = "default_engagement_balance_weight")]
    pub engagement_balance_weight: f64,

    /// Weights of the overall efficiency score
    #[serde(default)]
    pub weights: ScoreWeights,

    /// Extra action/decision phrases counted toward content density
    #[serde(default)]
    pub extra_content_markers: Vec<String>,

    /// Cutoffs of the qualitative efficiency report
    #[serde(default)]
    pub report: ReportThresholds,
}

/// Rating cutoffs (overall score, 0-100) and the levels at which a
/// dimension counts as a strength rather than a weakness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportThresholds {
    #[serde(default = "default_excellent_score")]
    pub excellent_score: f64,

    #[serde(default = "default_good_score")]
    pub good_score: f64,

    #[serde(default = "default_fair_score")]
    pub fair_score: f64,

    /// Participation balance (0-1)
    #[serde(default = "default_strong_balance")]
    pub strong_balance: f64,

    /// Engagement score (0-100)
    #[serde(default = "default_strong_engagement")]
    pub strong_engagement: f64,

    /// Content density (0-1)
    #[serde(default = "default_strong_content_density")]
    pub strong_content_density: f64,

    /// Pace score (0-1, 1 inside the target band)
    #[serde(default = "default_strong_pace")]
    pub strong_pace: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSettings {
    /// Participation balance below this fires a participation suggestion
    #[serde(default = "default_balance_low_water")]
    pub balance_low_water: f64,

    /// Engagement score below this fires a participation suggestion
    #[serde(default = "default_engagement_low_water")]
    pub engagement_low_water: f64,

    /// Words per minute above this fires a pacing suggestion
    #[serde(default = "default_wpm_high_water")]
    pub wpm_high_water: f64,

    /// Words per minute below this fires a pacing suggestion
    #[serde(default = "default_wpm_low_water")]
    pub wpm_low_water: f64,

    /// Content density below this fires a content suggestion
    #[serde(default = "default_content_density_low_water")]
    pub content_density_low_water: f64,

    /// Speaker turns per minute below this fires a structure suggestion
    #[serde(default = "default_min_turns_per_minute")]
    pub min_turns_per_minute: f64,

    /// Meetings shorter than this (minutes) skip the turn-rate rule
    #[serde(default = "default_min_minutes_for_turn_rule")]
    pub min_minutes_for_turn_rule: f64,

    /// Agenda/summary/decision rules need at least this many sentences
    #[serde(default = "default_structure_min_sentences")]
    pub structure_min_sentences: usize,

    /// More topics than this suggests splitting the meeting. Topic sets are
    /// capped at `analysis.num_topics`, so the rule only fires when that cap
    /// is raised above this value.
    #[serde(default = "default_max_topics_before_split")]
    pub max_topics_before_split: usize,

    /// LLM suggestions this similar to a rule suggestion are dropped
    #[serde(default = "default_llm_similarity_threshold")]
    pub llm_similarity_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (none, ollama, gemini)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key (for cloud providers)
    #[serde(default)]
    pub api_key: String,

    /// Model name (empty = provider default)
    #[serde(default)]
    pub model: String,

    /// API endpoint (empty = provider default)
    #[serde(default)]
    pub endpoint: String,
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_num_topics() -> usize {
    5
}

fn default_oracle_timeout_secs() -> u64 {
    30
}

fn default_max_context_sentences() -> usize {
    3
}

fn default_max_key_participants() -> usize {
    3
}

fn default_related_threshold() -> f64 {
    0.3
}

fn default_bigram_min_frequency() -> usize {
    2
}

fn default_tfidf_max_features() -> usize {
    100
}

fn default_kmeans_max_iterations() -> usize {
    50
}

fn default_pace_weight() -> f64 {
    0.2
}

fn default_balance_weight() -> f64 {
    0.25
}

fn default_engagement_weight() -> f64 {
    0.25
}

fn default_content_weight() -> f64 {
    0.3
}

fn default_assumed_wpm() -> f64 {
    130.0
}

fn default_target_wpm_low() -> f64 {
    120.0
}

fn default_target_wpm_high() -> f64 {
    160.0
}

fn default_target_words_per_turn() -> f64 {
    40.0
}

fn default_engagement_turn_weight() -> f64 {
    0.6
}

fn default_engagement_balance_weight() -> f64 {
    0.4
}

fn default_excellent_score() -> f64 {
    80.0
}

fn default_good_score() -> f64 {
    60.0
}

fn default_fair_score() -> f64 {
    40.0
}

fn default_strong_balance() -> f64 {
    0.7
}

fn default_strong_engagement() -> f64 {
    70.0
}

fn default_strong_content_density() -> f64 {
    0.6
}

fn default_strong_pace() -> f64 {
    0.7
}

fn default_balance_low_water() -> f64 {
    0.6
}

fn default_engagement_low_water() -> f64 {
    50.0
}

fn default_wpm_high_water() -> f64 {
    180.0
}

fn default_wpm_low_water() -> f64 {
    100.0
}

fn default_content_density_low_water() -> f64 {
    0.3
}

fn default_min_turns_per_minute() -> f64 {
    1.0
}

fn default_min_minutes_for_turn_rule() -> f64 {
    2.0
}

fn default_structure_min_sentences() -> usize {
    8
}

fn default_max_topics_before_split() -> usize {
    7
}

fn default_llm_similarity_threshold() -> f64 {
    0.5
}

fn default_llm_provider() -> String {
    "none".to_string()
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            num_topics: default_num_topics(),
            use_llm: false,
            oracle_timeout_secs: default_oracle_timeout_secs(),
        }
    }
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            max_context_sentences: default_max_context_sentences(),
            max_key_participants: default_max_key_participants(),
            related_threshold: default_related_threshold(),
            bigram_min_frequency: default_bigram_min_frequency(),
            tfidf_max_features: default_tfidf_max_features(),
            kmeans_max_iterations: default_kmeans_max_iterations(),
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            pace: default_pace_weight(),
            balance: default_balance_weight(),
            engagement: default_engagement_weight(),
            content: default_content_weight(),
        }
    }
}

impl Default for EfficiencySettings {
    fn default() -> Self {
        Self {
            assumed_words_per_minute: default_assumed_wpm(),
            target_wpm_low: default_target_wpm_low(),
            target_wpm_high: default_target_wpm_high(),
            target_words_per_turn: default_target_words_per_turn(),
            engagement_turn_weight: default_engagement_turn_weight(),
            engagement_balance_weight: default_engagement_balance_weight(),
            weights: ScoreWeights::default(),
            extra_content_markers: Vec::new(),
            report: ReportThresholds::default(),
        }
    }
}

impl Default for ReportThresholds {
    fn default() -> Self {
        Self {
            excellent_score: default_excellent_score(),
            good_score: default_good_score(),
            fair_score: default_fair_score(),
            strong_balance: default_strong_balance(),
            strong_engagement: default_strong_engagement(),
            strong_content_density: default_strong_content_density(),
            strong_pace: default_strong_pace(),
        }
    }
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            balance_low_water: default_balance_low_water(),
            engagement_low_water: default_engagement_low_water(),
            wpm_high_water: default_wpm_high_water(),
            wpm_low_water: default_wpm_low_water(),
            content_density_low_water: default_content_density_low_water(),
            min_turns_per_minute: default_min_turns_per_minute(),
            min_minutes_for_turn_rule: default_min_minutes_for_turn_rule(),
            structure_min_sentences: default_structure_min_sentences(),
            max_topics_before_split: default_max_topics_before_split(),
            llm_similarity_threshold: default_llm_similarity_threshold(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: String::new(),
            model: String::new(),
            endpoint: String::new(),
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.pace + self.balance + self.engagement + self.content
    }
}

impl Settings {
    /// Load settings from a TOML file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No analytics config at {}, using defaults", path.display());
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Parse settings from TOML text, then apply env overrides and validate
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if self.llm.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                if !key.trim().is_empty() {
                    self.llm.api_key = key;
                }
            }
        }
    }

    /// Reject weights and thresholds that would make scores meaningless
    pub fn validate(&self) -> Result<()> {
        let weights = &self.efficiency.weights;
        for (name, value) in [
            ("efficiency.weights.pace", weights.pace),
            ("efficiency.weights.balance", weights.balance),
            ("efficiency.weights.engagement", weights.engagement),
            ("efficiency.weights.content", weights.content),
            ("efficiency.engagement_turn_weight", self.efficiency.engagement_turn_weight),
            ("efficiency.engagement_balance_weight", self.efficiency.engagement_balance_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{} must be a non-negative number, got {}", name, value);
            }
        }

        if weights.total() <= 0.0 {
            anyhow::bail!("efficiency.weights must not all be zero");
        }

        if self.efficiency.engagement_turn_weight + self.efficiency.engagement_balance_weight <= 0.0
        {
            anyhow::bail!("engagement weights must not both be zero");
        }

        for (name, value) in [
            ("efficiency.assumed_words_per_minute", self.efficiency.assumed_words_per_minute),
            ("efficiency.target_wpm_low", self.efficiency.target_wpm_low),
            ("efficiency.target_words_per_turn", self.efficiency.target_words_per_turn),
        ] {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("{} must be positive, got {}", name, value);
            }
        }

        if self.efficiency.target_wpm_high < self.efficiency.target_wpm_low {
            anyhow::bail!(
                "efficiency.target_wpm_high ({}) is below target_wpm_low ({})",
                self.efficiency.target_wpm_high,
                self.efficiency.target_wpm_low
            );
        }

        let report = &self.efficiency.report;
        if !(report.excellent_score >= report.good_score && report.good_score >= report.fair_score)
        {
            anyhow::bail!(
                "efficiency.report cutoffs must descend: excellent {} >= good {} >= fair {}",
                report.excellent_score,
                report.good_score,
                report.fair_score
            );
        }

        if !(0.0..=1.0).contains(&self.topics.related_threshold) {
            anyhow::bail!(
                "topics.related_threshold must be within [0, 1], got {}",
                self.topics.related_threshold
            );
        }

        Ok(())
    }

    /// Write default configuration to a file
    pub fn write_default(path: &Path) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Oracle timeout as a `Duration`
    pub fn oracle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.analysis.oracle_timeout_secs)
    }
}
