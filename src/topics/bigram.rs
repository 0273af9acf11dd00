//! Bigram frequency tier

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::text::content_tokens;
use crate::topics::models::{Candidate, TierError, TierInput, TierResult};

#[derive(Default)]
struct BigramStats {
    count: usize,
    first_seen: usize,
    sentences: BTreeSet<usize>,
    speakers: BTreeMap<String, usize>,
}

/// Frequent adjacent content-word pairs, ranked by frequency times
/// distinctiveness. Phrases spread evenly across every speaker are filler
/// more often than topics, so they are down-weighted.
pub(crate) fn extract(input: &TierInput<'_>) -> TierResult {
    if !input.capabilities.collocations {
        return Err(TierError::Unavailable(
            "collocation extraction disabled".to_string(),
        ));
    }

    let mut stats: HashMap<(String, String), BigramStats> = HashMap::new();
    let mut position = 0;

    for (index, sentence) in input.sentences.iter().enumerate() {
        let words = content_tokens(&sentence.text);
        for pair in words.windows(2) {
            if pair[0] == pair[1] {
                continue;
            }
            let entry = stats
                .entry((pair[0].clone(), pair[1].clone()))
                .or_insert_with(|| BigramStats {
                    first_seen: position,
                    ..Default::default()
                });
            entry.count += 1;
            entry.sentences.insert(index);
            let speaker = sentence
                .speaker
                .clone()
                .unwrap_or_else(|| crate::transcript::UNATTRIBUTED.to_string());
            *entry.speakers.entry(speaker).or_default() += 1;
            position += 1;
        }
    }

    let min_frequency = input.settings.bigram_min_frequency.max(1);
    let speaker_total = distinct_speakers(input);

    let mut ranked: Vec<((String, String), BigramStats, f64)> = stats
        .into_iter()
        .filter(|(_, s)| s.count >= min_frequency)
        .map(|(pair, s)| {
            let score = s.count as f64 * distinctiveness(&s.speakers, speaker_total);
            (pair, s, score)
        })
        .collect();

    if ranked.is_empty() {
        return Err(TierError::Insufficient(format!(
            "no bigram occurs {} or more times",
            min_frequency
        )));
    }

    ranked.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.first_seen.cmp(&b.1.first_seen))
    });
    ranked.truncate(input.num_topics);

    let top = ranked[0].2;
    if !top.is_finite() || top <= 0.0 {
        return Err(TierError::Failed(format!("degenerate bigram score {}", top)));
    }

    Ok(ranked
        .into_iter()
        .map(|((first, second), s, score)| Candidate {
            label: format!("{} {}", first, second),
            relevance: score / top,
            terms: vec![first, second],
            sentences: s.sentences.into_iter().collect(),
        })
        .collect())
}

fn distinct_speakers(input: &TierInput<'_>) -> usize {
    input
        .transcript
        .utterances
        .iter()
        .map(|u| u.speaker_label())
        .collect::<BTreeSet<_>>()
        .len()
}

/// 1 for a phrase owned by one speaker, 0.5 for one spread perfectly evenly
fn distinctiveness(speakers: &BTreeMap<String, usize>, speaker_total: usize) -> f64 {
    if speaker_total < 2 {
        return 1.0;
    }

    let total: usize = speakers.values().sum();
    if total == 0 {
        return 1.0;
    }

    let entropy: f64 = speakers
        .values()
        .map(|count| {
            let p = *count as f64 / total as f64;
            -p * p.ln()
        })
        .sum();
    let normalized = entropy / (speaker_total as f64).ln();

    1.0 - 0.5 * normalized.clamp(0.0, 1.0)
}
