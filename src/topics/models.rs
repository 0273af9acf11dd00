//! Data models for topics

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::text::Sentence;
use crate::config::TopicSettings;
use crate::transcript::Transcript;

/// Tier that produced a topic set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicMethod {
    Llm,
    Clustering,
    Bigram,
    Keyword,
    /// Nothing to analyze
    Skipped,
}

impl fmt::Display for TopicMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TopicMethod::Llm => "llm",
            TopicMethod::Clustering => "clustering",
            TopicMethod::Bigram => "bigram",
            TopicMethod::Keyword => "keyword",
            TopicMethod::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

/// A labeled slice of the discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub label: String,

    /// In [0, 1]; topics may overlap so scores need not sum to 1
    pub relevance_score: f64,

    /// Representative sentences, in transcript order
    pub context_sentences: Vec<String>,

    /// Fraction of topic time spent on this topic
    pub time_share: f64,

    /// Speakers ranked by how many relevant utterances they contributed
    pub key_participants: Vec<String>,

    /// Labels of topics whose context overlaps this one
    pub related_topics: BTreeSet<String>,

    /// Number of utterances touching the topic
    pub mentions: usize,

    pub method: TopicMethod,
}

/// Optional analysis capabilities available at runtime.
///
/// Clustering additionally needs the `clustering` cargo feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCapabilities {
    /// TF-IDF vectors and k-means
    pub clustering: bool,

    /// Bigram (collocation) extraction
    pub collocations: bool,
}

impl TopicCapabilities {
    pub fn all() -> Self {
        Self {
            clustering: true,
            collocations: true,
        }
    }

    /// Keyword frequency only
    pub fn none() -> Self {
        Self {
            clustering: false,
            collocations: false,
        }
    }

    pub fn clustering_available(&self) -> bool {
        self.clustering && cfg!(feature = "clustering")
    }
}

impl Default for TopicCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// Why a tier handed over to the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    /// Dependency disabled or compiled out, or oracle absent or unusable
    Unavailable,
    /// Valid input, but too little of it for this tier
    Insufficient,
    /// The tier itself broke on valid input
    Failed,
}

/// A tier that did not produce the final topics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicFallback {
    pub method: TopicMethod,
    pub kind: FallbackKind,
    pub reason: String,
}

/// Topics plus a record of how they were obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicReport {
    pub topics: Vec<Topic>,

    /// Tier that actually produced `topics`
    pub method: TopicMethod,

    /// Tier the caller asked for
    pub preferred: TopicMethod,

    /// Tiers skipped on the way down, in cascade order
    pub fallbacks: Vec<TopicFallback>,
}

impl TopicReport {
    pub(crate) fn skipped(preferred: TopicMethod) -> Self {
        Self {
            topics: Vec::new(),
            method: TopicMethod::Skipped,
            preferred,
            fallbacks: Vec::new(),
        }
    }

    /// True when a lower tier than the preferred one produced the topics
    pub fn is_degraded(&self) -> bool {
        self.method != TopicMethod::Skipped && self.method != self.preferred
    }

    /// One-line account of the fallbacks, for status details
    pub fn describe(&self) -> String {
        if self.method == TopicMethod::Skipped {
            return "no content to analyze".to_string();
        }

        let mut detail = format!("topics from {} tier", self.method);
        if !self.fallbacks.is_empty() {
            let reasons: Vec<String> = self
                .fallbacks
                .iter()
                .map(|f| format!("{}: {}", f.method, f.reason))
                .collect();
            detail.push_str(&format!(" (fell back past {})", reasons.join("; ")));
        }
        detail
    }
}

/// A tier's raw output, before enrichment
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub label: String,
    pub relevance: f64,
    /// Vocabulary used to find relevant utterances
    pub terms: Vec<String>,
    /// Indices into the sentence list backing this topic, if the tier knows them
    pub sentences: Vec<usize>,
}

/// Why a tier produced nothing
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TierError {
    Unavailable(String),
    Insufficient(String),
    Failed(String),
}

impl TierError {
    pub fn into_fallback(self, method: TopicMethod) -> TopicFallback {
        let (kind, reason) = match self {
            TierError::Unavailable(reason) => (FallbackKind::Unavailable, reason),
            TierError::Insufficient(reason) => (FallbackKind::Insufficient, reason),
            TierError::Failed(reason) => (FallbackKind::Failed, reason),
        };
        TopicFallback {
            method,
            kind,
            reason,
        }
    }
}

pub(crate) type TierResult = std::result::Result<Vec<Candidate>, TierError>;

/// Read-only view shared by every tier
pub(crate) struct TierInput<'a> {
    pub transcript: &'a Transcript,
    pub sentences: &'a [Sentence],
    pub num_topics: usize,
    pub settings: &'a TopicSettings,
    pub capabilities: TopicCapabilities,
}
