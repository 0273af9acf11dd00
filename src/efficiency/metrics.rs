//! Data models for efficiency metrics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::efficiency::report::EfficiencyReport;

/// Where the meeting duration came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSource {
    /// Latest end time minus earliest start time
    Measured,
    /// The transcript's total-duration hint
    Hinted,
    /// Word count divided by an assumed speaking rate
    Estimated,
    /// Nothing to measure or estimate from
    #[default]
    Unknown,
}

impl DurationSource {
    pub fn is_measured(&self) -> bool {
        matches!(self, DurationSource::Measured | DurationSource::Hinted)
    }
}

/// Differences against a caller-supplied baseline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// `current - baseline` for every numeric field
    pub deltas: BTreeMap<String, f64>,

    /// Score-like fields that went up
    pub improved: Vec<String>,

    /// Score-like fields that went down
    pub regressed: Vec<String>,
}

/// Quantitative efficiency metrics of one meeting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    /// Total words, attributed or not
    pub word_count: usize,

    pub sentence_count: usize,

    /// Maximal runs of consecutive utterances by the same speaker
    pub speaker_turn_count: usize,

    /// Distinct attributed speakers
    pub speaker_count: usize,

    /// Meeting length in seconds
    pub estimated_duration_secs: f64,

    pub duration_source: DurationSource,

    pub words_per_minute: f64,

    /// Words per sentence
    pub avg_sentence_length: f64,

    /// 0 = one voice dominates completely, 1 = perfectly even split
    pub participation_balance: f64,

    /// Share of all words per speaker, unattributed words under their own key
    pub speaker_shares: BTreeMap<String, f64>,

    /// 0-100 composite of turn frequency and balance
    pub engagement_score: f64,

    /// Fraction of sentences carrying an action item or a decision
    pub content_density: f64,

    pub question_count: usize,

    pub action_item_count: usize,

    pub decision_count: usize,

    pub has_agenda: bool,

    pub has_summary: bool,

    /// Deadlines mentioned, in order of first mention
    pub deadline_mentions: Vec<String>,

    /// 0-100 weighted composite
    pub overall_efficiency_score: f64,

    /// Rating, strengths, and weaknesses read off the numbers above
    #[serde(default)]
    pub report: EfficiencyReport,

    /// Present only when a baseline was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

/// Fields where a higher value means a better meeting
pub(crate) const SCORE_FIELDS: &[&str] = &[
    "participation_balance",
    "engagement_score",
    "content_density",
    "overall_efficiency_score",
];

impl EfficiencyMetrics {
    /// Every numeric metric by name, in a fixed order
    pub fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("word_count", self.word_count as f64),
            ("sentence_count", self.sentence_count as f64),
            ("speaker_turn_count", self.speaker_turn_count as f64),
            ("speaker_count", self.speaker_count as f64),
            ("estimated_duration_secs", self.estimated_duration_secs),
            ("words_per_minute", self.words_per_minute),
            ("avg_sentence_length", self.avg_sentence_length),
            ("participation_balance", self.participation_balance),
            ("engagement_score", self.engagement_score),
            ("content_density", self.content_density),
            ("question_count", self.question_count as f64),
            ("action_item_count", self.action_item_count as f64),
            ("decision_count", self.decision_count as f64),
            ("overall_efficiency_score", self.overall_efficiency_score),
        ]
    }

    /// Duration in minutes
    pub fn duration_minutes(&self) -> f64 {
        self.estimated_duration_secs / 60.0
    }

    /// Attributed speakers with the largest word share, most dominant first.
    /// Returns every speaker tied at the top share.
    pub fn dominant_speakers(&self) -> Vec<&str> {
        let attributed = self
            .speaker_shares
            .iter()
            .filter(|(name, _)| name.as_str() != crate::transcript::UNATTRIBUTED);

        let top = attributed.clone().map(|(_, share)| *share).fold(0.0, f64::max);
        if top <= 0.0 {
            return Vec::new();
        }

        attributed
            .filter(|(_, share)| (top - **share).abs() < 1e-9)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Compare against a baseline, producing per-field deltas
    pub fn compare_to(&self, baseline: &EfficiencyMetrics) -> Comparison {
        let before: BTreeMap<&str, f64> = baseline.numeric_fields().into_iter().collect();
        let mut comparison = Comparison::default();

        for (name, current) in self.numeric_fields() {
            let delta = current - before.get(name).copied().unwrap_or(0.0);
            comparison.deltas.insert(name.to_string(), delta);

            if SCORE_FIELDS.contains(&name) {
                if delta > 1e-9 {
                    comparison.improved.push(name.to_string());
                } else if delta < -1e-9 {
                    comparison.regressed.push(name.to_string());
                }
            }
        }

        comparison
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_flags_improvements() {
        let baseline = EfficiencyMetrics {
            word_count: 100,
            engagement_score: 40.0,
            overall_efficiency_score: 70.0,
            ..Default::default()
        };
        let current = EfficiencyMetrics {
            word_count: 120,
            engagement_score: 55.0,
            overall_efficiency_score: 60.0,
            ..Default::default()
        };

        let comparison = current.compare_to(&baseline);
        assert_eq!(comparison.deltas["word_count"], 20.0);
        assert_eq!(comparison.deltas["engagement_score"], 15.0);
        assert_eq!(comparison.improved, vec!["engagement_score"]);
        assert_eq!(comparison.regressed, vec!["overall_efficiency_score"]);
    }

    #[test]
    fn dominant_speakers_ignore_unattributed() {
        let mut metrics = EfficiencyMetrics::default();
        metrics.speaker_shares.insert("unattributed".to_string(), 0.7);
        metrics.speaker_shares.insert("A".to_string(), 0.2);
        metrics.speaker_shares.insert("B".to_string(), 0.1);
        assert_eq!(metrics.dominant_speakers(), vec!["A"]);
    }

    #[test]
    fn comparison_is_omitted_from_json_without_baseline() {
        let json = serde_json::to_value(EfficiencyMetrics::default()).unwrap();
        assert!(json.get("comparison").is_none());
        assert_eq!(json["duration_source"], "unknown");
    }
}
