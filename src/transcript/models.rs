//! Data models for transcripts

use serde::{Deserialize, Serialize};

use crate::{AnalyticsError, Result};

/// Label used wherever an utterance without a speaker tag must be named
pub const UNATTRIBUTED: &str = "unattributed";

/// One speaker turn's text plus optional timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Speaker tag, if the transcript carried one
    #[serde(default)]
    pub speaker: Option<String>,

    /// Spoken text
    pub text: String,

    /// Start time in seconds from the beginning of the meeting
    #[serde(default)]
    pub start_secs: Option<f64>,

    /// End time in seconds from the beginning of the meeting
    #[serde(default)]
    pub end_secs: Option<f64>,
}

impl Utterance {
    /// Create an unattributed, untimed utterance
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            speaker: None,
            text: text.into(),
            start_secs: None,
            end_secs: None,
        }
    }

    /// Attribute the utterance to a speaker
    pub fn spoken_by(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Attach start and end times (seconds from meeting start)
    pub fn at(mut self, start_secs: f64, end_secs: f64) -> Self {
        self.start_secs = Some(start_secs);
        self.end_secs = Some(end_secs);
        self
    }

    /// Attach only a start time
    pub fn starting_at(mut self, start_secs: f64) -> Self {
        self.start_secs = Some(start_secs);
        self
    }

    /// Whitespace-delimited word count
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Speaker tag, or [`UNATTRIBUTED`]
    pub fn speaker_label(&self) -> &str {
        self.speaker.as_deref().unwrap_or(UNATTRIBUTED)
    }

    fn validate(&self, index: usize) -> Result<()> {
        for (name, value) in [("start", self.start_secs), ("end", self.end_secs)] {
            if let Some(secs) = value {
                if !secs.is_finite() || secs < 0.0 {
                    return Err(AnalyticsError::InvalidTranscript(format!(
                        "utterance {} has invalid {} time {}",
                        index, name, secs
                    )));
                }
            }
        }

        if let (Some(start), Some(end)) = (self.start_secs, self.end_secs) {
            if end < start {
                return Err(AnalyticsError::InvalidTranscript(format!(
                    "utterance {} ends ({}s) before it starts ({}s)",
                    index, end, start
                )));
            }
        }

        Ok(())
    }
}

/// An ordered sequence of utterances plus an optional total-duration hint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Utterances in chronological order
    pub utterances: Vec<Utterance>,

    /// Total meeting length in seconds, when the loader knows it
    #[serde(default)]
    pub duration_hint_secs: Option<f64>,
}

impl Transcript {
    /// Create a transcript from utterances
    pub fn new(utterances: Vec<Utterance>) -> Self {
        Self {
            utterances,
            duration_hint_secs: None,
        }
    }

    /// Attach a total-duration hint
    pub fn with_duration_hint(mut self, secs: f64) -> Self {
        self.duration_hint_secs = Some(secs);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    /// Total words across all utterances, attributed or not
    pub fn word_count(&self) -> usize {
        self.utterances.iter().map(Utterance::word_count).sum()
    }

    /// Distinct attributed speakers in order of first appearance
    pub fn speakers(&self) -> Vec<&str> {
        let mut speakers: Vec<&str> = Vec::new();
        for speaker in self.utterances.iter().filter_map(|u| u.speaker.as_deref()) {
            if !speakers.contains(&speaker) {
                speakers.push(speaker);
            }
        }
        speakers
    }

    /// True when every utterance has a start time
    pub fn is_fully_timed(&self) -> bool {
        !self.utterances.is_empty() && self.utterances.iter().all(|u| u.start_secs.is_some())
    }

    /// Latest end time minus earliest start time, if any timing exists
    pub fn measured_duration_secs(&self) -> Option<f64> {
        let mut earliest: Option<f64> = None;
        let mut latest: Option<f64> = None;

        for utterance in &self.utterances {
            let Some(start) = utterance.start_secs else {
                continue;
            };
            let end = utterance.end_secs.unwrap_or(start);
            earliest = Some(earliest.map_or(start, |e| e.min(start)));
            latest = Some(latest.map_or(end, |l| l.max(end)));
        }

        match (earliest, latest) {
            (Some(start), Some(end)) if end > start => Some(end - start),
            _ => None,
        }
    }

    /// Seconds spent on one utterance: its own span, or the gap to the next start
    pub fn speaking_secs(&self, index: usize) -> Option<f64> {
        let utterance = self.utterances.get(index)?;
        let start = utterance.start_secs?;

        let end = utterance.end_secs.or_else(|| {
            self.utterances
                .get(index + 1)
                .and_then(|next| next.start_secs)
                .filter(|next_start| *next_start >= start)
        })?;

        Some(end - start)
    }

    /// Reject transcripts no analysis can make sense of
    pub fn validate(&self) -> Result<()> {
        if let Some(hint) = self.duration_hint_secs {
            if !hint.is_finite() || hint < 0.0 {
                return Err(AnalyticsError::InvalidTranscript(format!(
                    "duration hint must be a non-negative number of seconds, got {}",
                    hint
                )));
            }
        }

        for (index, utterance) in self.utterances.iter().enumerate() {
            utterance.validate(index)?;
        }

        Ok(())
    }
}
