//! Keyword frequency tier: the fallback that always works

use std::collections::HashMap;

use crate::text::content_tokens;
use crate::topics::models::{Candidate, TierInput, TierResult};

/// Most frequent content words, ties broken by first appearance
pub(crate) fn extract(input: &TierInput<'_>) -> TierResult {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut position = 0;

    for sentence in input.sentences {
        for token in content_tokens(&sentence.text) {
            let entry = counts.entry(token).or_insert((0, position));
            entry.0 += 1;
            position += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(input.num_topics);

    let top = ranked.first().map_or(1, |(_, count, _)| *count) as f64;

    Ok(ranked
        .into_iter()
        .map(|(token, count, _)| Candidate {
            label: token.clone(),
            relevance: count as f64 / top,
            terms: vec![token],
            sentences: Vec::new(),
        })
        .collect())
}
