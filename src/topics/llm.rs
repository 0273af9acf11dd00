//! LLM tier: ask the oracle for labels and justifying quotes

use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use crate::oracle::{self, parse, prompts, Oracle};
use crate::text::{content_tokens, Sentence};
use crate::topics::models::{Candidate, TierError, TierInput, TierResult};

/// Share of a quote's content words a sentence must contain to count as its source
const QUOTE_OVERLAP: f64 = 0.6;

#[derive(Debug, Deserialize)]
struct TopicResponse {
    topics: Vec<ResponseTopic>,
}

/// Models return either bare labels or objects; accept both
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponseTopic {
    Bare(String),
    Detailed {
        #[serde(alias = "topic", alias = "name")]
        label: String,
        #[serde(default)]
        relevance: Option<f64>,
        #[serde(default, alias = "context")]
        quotes: Vec<String>,
    },
}

pub(crate) async fn extract(
    input: &TierInput<'_>,
    oracle: Option<&dyn Oracle>,
    timeout: Duration,
) -> TierResult {
    let Some(oracle) = oracle else {
        return Err(TierError::Unavailable("no oracle configured".to_string()));
    };

    let rendered = prompts::render_transcript(input.transcript);
    let prompt = prompts::build_topic_prompt(&rendered, input.num_topics);

    let completion = oracle::ask(oracle, &prompt, timeout)
        .await
        .map_err(|e| TierError::Unavailable(e.to_string()))?;

    let response: TopicResponse = parse::parse_embedded(&completion)
        .map_err(|e| TierError::Unavailable(e.to_string()))?;

    let candidates = to_candidates(response, input.sentences, input.num_topics);
    if candidates.is_empty() {
        return Err(TierError::Unavailable("oracle returned no topics".to_string()));
    }

    Ok(candidates)
}

fn to_candidates(response: TopicResponse, sentences: &[Sentence], limit: usize) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for topic in response.topics {
        let (label, relevance, quotes) = match topic {
            ResponseTopic::Bare(label) => (label, None, Vec::new()),
            ResponseTopic::Detailed {
                label,
                relevance,
                quotes,
            } => (label, relevance, quotes),
        };

        let label = label.trim().to_string();
        if label.is_empty() {
            continue;
        }

        let rank_default = (1.0 - 0.1 * candidates.len() as f64).max(0.1);
        let relevance = relevance
            .filter(|r| r.is_finite())
            .map_or(rank_default, |r| r.clamp(0.0, 1.0));

        let mut matched: Vec<usize> = quotes
            .iter()
            .filter_map(|quote| match_quote(quote, sentences))
            .collect();
        matched.sort_unstable();
        matched.dedup();

        candidates.push(Candidate {
            terms: content_tokens(&label),
            label,
            relevance,
            sentences: matched,
        });

        if candidates.len() == limit {
            break;
        }
    }

    candidates
}

/// The sentence a quote was taken from: containment first, then word overlap
fn match_quote(quote: &str, sentences: &[Sentence]) -> Option<usize> {
    let needle = normalize(quote);
    if needle.is_empty() {
        return None;
    }

    let contained = sentences.iter().position(|s| {
        let haystack = normalize(&s.text);
        !haystack.is_empty() && (haystack.contains(&needle) || needle.contains(&haystack))
    });
    if contained.is_some() {
        return contained;
    }

    let quote_words: HashSet<String> = content_tokens(quote).into_iter().collect();
    if quote_words.is_empty() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (index, sentence) in sentences.iter().enumerate() {
        let words: HashSet<String> = content_tokens(&sentence.text).into_iter().collect();
        let overlap = quote_words.intersection(&words).count() as f64 / quote_words.len() as f64;
        if overlap >= QUOTE_OVERLAP && best.map_or(true, |(_, b)| overlap > b) {
            best = Some((index, overlap));
        }
    }
    best.map(|(index, _)| index)
}

fn normalize(text: &str) -> String {
    crate::text::tokens(text).join(" ")
}
