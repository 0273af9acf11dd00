use std::collections::BTreeMap;

use tracing::debug;

use crate::config::EfficiencySettings;
use crate::efficiency::metrics::{DurationSource, EfficiencyMetrics};
use crate::efficiency::report;
use crate::text::{self, markers};
use crate::transcript::Transcript;
use crate::{AnalyticsError, Result};

/// Computes [`EfficiencyMetrics`] from a transcript.
///
/// Deterministic: the same transcript, baseline, and settings always give
/// the same metrics.
#[derive(Debug, Clone, Default)]
pub struct EfficiencyAnalyzer {
    settings: EfficiencySettings,
}

impl EfficiencyAnalyzer {
    pub fn new(settings: EfficiencySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EfficiencySettings {
        &self.settings
    }

    /// Analyze with the configured content markers only
    pub fn analyze(
        &self,
        transcript: &Transcript,
        baseline: Option<&EfficiencyMetrics>,
    ) -> Result<EfficiencyMetrics> {
        self.analyze_with_markers(transcript, baseline, &[])
    }

    /// Analyze, counting `external_markers` (e.g. action items found by
    /// minutes extraction) as extra content markers.
    pub fn analyze_with_markers(
        &self,
        transcript: &Transcript,
        baseline: Option<&EfficiencyMetrics>,
        external_markers: &[String],
    ) -> Result<EfficiencyMetrics> {
        let mut metrics = EfficiencyMetrics::default();

        if transcript.is_empty() {
            debug!("Empty transcript, efficiency metrics are all zero");
            metrics.comparison = baseline.map(|b| metrics.compare_to(b));
            return Ok(metrics);
        }

        let mut content_markers = self.settings.extra_content_markers.clone();
        content_markers.extend(external_markers.iter().cloned());

        // Basic counts
        metrics.word_count = transcript.word_count();
        metrics.speaker_turn_count = count_turns(transcript);
        metrics.speaker_count = transcript.speakers().len();

        let sentences = text::transcript_sentences(transcript);
        metrics.sentence_count = sentences.len();
        if metrics.sentence_count > 0 {
            metrics.avg_sentence_length = metrics.word_count as f64 / metrics.sentence_count as f64;
        }

        // Duration and pace
        let (duration_secs, source) = self.duration(transcript, metrics.word_count);
        metrics.estimated_duration_secs = duration_secs;
        metrics.duration_source = source;
        if duration_secs > 0.0 {
            metrics.words_per_minute = metrics.word_count as f64 / (duration_secs / 60.0);
        }

        // Participation
        metrics.speaker_shares = speaker_shares(transcript, metrics.word_count);
        metrics.participation_balance = participation_balance(transcript);
        metrics.engagement_score = self.engagement(&metrics);

        // Content
        for sentence in &sentences {
            let is_action = markers::is_action_sentence(&sentence.text, &content_markers);
            let is_decision = markers::is_decision_sentence(&sentence.text);

            if is_action {
                metrics.action_item_count += 1;
            }
            if is_decision {
                metrics.decision_count += 1;
            }
            if is_action || is_decision {
                metrics.content_density += 1.0;
            }
            if sentence.text.trim_end().ends_with('?') {
                metrics.question_count += 1;
            }
        }
        if metrics.sentence_count > 0 {
            metrics.content_density /= metrics.sentence_count as f64;
        }

        for utterance in &transcript.utterances {
            metrics.has_agenda |= markers::mentions_agenda(&utterance.text);
            metrics.has_summary |= markers::mentions_summary(&utterance.text);

            for deadline in markers::deadline_mentions(&utterance.text) {
                if !metrics
                    .deadline_mentions
                    .iter()
                    .any(|d| d.eq_ignore_ascii_case(&deadline))
                {
                    metrics.deadline_mentions.push(deadline);
                }
            }
        }

        metrics.overall_efficiency_score = self.overall_score(&metrics);

        ensure_finite(&metrics)?;

        metrics.report = report::assess(
            &metrics,
            self.pace_score(metrics.words_per_minute),
            &self.settings.report,
        );

        if let Some(baseline) = baseline {
            metrics.comparison = Some(metrics.compare_to(baseline));
        }

        debug!(
            "Efficiency: {} words, {} turns, {:.1} wpm, score {:.1} ({})",
            metrics.word_count,
            metrics.speaker_turn_count,
            metrics.words_per_minute,
            metrics.overall_efficiency_score,
            metrics.report.rating
        );

        Ok(metrics)
    }

    /// Measured timestamps win, then the duration hint, then an estimate
    fn duration(&self, transcript: &Transcript, word_count: usize) -> (f64, DurationSource) {
        if let Some(measured) = transcript.measured_duration_secs() {
            return (measured, DurationSource::Measured);
        }

        if let Some(hint) = transcript.duration_hint_secs.filter(|h| *h > 0.0) {
            return (hint, DurationSource::Hinted);
        }

        if word_count == 0 {
            return (0.0, DurationSource::Unknown);
        }

        let minutes = word_count as f64 / self.settings.assumed_words_per_minute;
        (minutes * 60.0, DurationSource::Estimated)
    }

    /// 0-100: many short turns and an even split score high
    fn engagement(&self, metrics: &EfficiencyMetrics) -> f64 {
        if metrics.speaker_turn_count == 0 {
            return 0.0;
        }

        let words_per_turn = metrics.word_count as f64 / metrics.speaker_turn_count as f64;
        let turn_score = if words_per_turn <= 0.0 {
            0.0
        } else {
            (self.settings.target_words_per_turn / words_per_turn).min(1.0)
        };

        let turn_weight = self.settings.engagement_turn_weight;
        let balance_weight = self.settings.engagement_balance_weight;
        let total = turn_weight + balance_weight;
        if total <= 0.0 {
            return 0.0;
        }

        100.0 * (turn_weight * turn_score + balance_weight * metrics.participation_balance) / total
    }

    /// Pace inside the target band scores 1; slower or faster falls off linearly
    fn pace_score(&self, words_per_minute: f64) -> f64 {
        let low = self.settings.target_wpm_low;
        let high = self.settings.target_wpm_high;

        if words_per_minute <= 0.0 {
            0.0
        } else if words_per_minute < low {
            words_per_minute / low
        } else if words_per_minute > high {
            (1.0 - (words_per_minute - high) / high).max(0.0)
        } else {
            1.0
        }
    }

    fn overall_score(&self, metrics: &EfficiencyMetrics) -> f64 {
        if metrics.word_count == 0 {
            return 0.0;
        }

        let weights = &self.settings.weights;
        let total = weights.total();
        if total <= 0.0 {
            return 0.0;
        }

        let weighted = weights.pace * self.pace_score(metrics.words_per_minute)
            + weights.balance * metrics.participation_balance
            + weights.engagement * (metrics.engagement_score / 100.0)
            + weights.content * metrics.content_density;

        (100.0 * weighted / total).clamp(0.0, 100.0)
    }
}

/// Runs of consecutive utterances with the same speaker tag
fn count_turns(transcript: &Transcript) -> usize {
    let mut turns = 0;
    let mut previous: Option<Option<&str>> = None;

    for utterance in &transcript.utterances {
        let speaker = utterance.speaker.as_deref();
        if previous != Some(speaker) {
            turns += 1;
            previous = Some(speaker);
        }
    }

    turns
}

fn speaker_shares(transcript: &Transcript, word_count: usize) -> BTreeMap<String, f64> {
    let mut shares: BTreeMap<String, f64> = BTreeMap::new();
    if word_count == 0 {
        return shares;
    }

    for utterance in &transcript.utterances {
        *shares.entry(utterance.speaker_label().to_string()).or_default() +=
            utterance.word_count() as f64;
    }

    for share in shares.values_mut() {
        *share /= word_count as f64;
    }
    shares.retain(|_, share| *share > 0.0);
    shares
}

/// 1 minus the normalized deviation from an equal split among attributed
/// speakers. Fewer than two speakers have no balance to speak of.
fn participation_balance(transcript: &Transcript) -> f64 {
    let mut words: BTreeMap<&str, usize> = BTreeMap::new();
    for utterance in &transcript.utterances {
        if let Some(speaker) = utterance.speaker.as_deref() {
            *words.entry(speaker).or_default() += utterance.word_count();
        }
    }

    let speakers = words.len();
    let total: usize = words.values().sum();
    if speakers < 2 || total == 0 {
        return 0.0;
    }

    let equal = 1.0 / speakers as f64;
    let deviation: f64 = words
        .values()
        .map(|w| (*w as f64 / total as f64 - equal).abs())
        .sum();
    let max_deviation = 2.0 * (1.0 - equal);

    (1.0 - deviation / max_deviation).clamp(0.0, 1.0)
}

fn ensure_finite(metrics: &EfficiencyMetrics) -> Result<()> {
    let shares = metrics
        .speaker_shares
        .iter()
        .map(|(_, share)| ("speaker_shares", *share));

    for (name, value) in metrics.numeric_fields().into_iter().chain(shares) {
        if !value.is_finite() {
            return Err(AnalyticsError::Component(format!(
                "efficiency metric {} is not finite ({})",
                name, value
            )));
        }
    }
    Ok(())
}
