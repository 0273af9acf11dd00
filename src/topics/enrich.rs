//! Shared post-processing for every tier: time share, participants,
//! related topics, and final ranking.

use std::collections::{BTreeSet, HashSet};

use crate::text::content_tokens;
use crate::topics::models::{Candidate, TierInput, Topic, TopicMethod};
use crate::transcript::Transcript;

struct Evidence {
    context: BTreeSet<usize>,
    utterances: BTreeSet<usize>,
}

pub(crate) fn enrich(candidates: Vec<Candidate>, method: TopicMethod, input: &TierInput<'_>) -> Vec<Topic> {
    let candidates = rank(candidates, input.num_topics);
    if candidates.is_empty() {
        return Vec::new();
    }

    let sentence_words: Vec<HashSet<String>> = input
        .sentences
        .iter()
        .map(|s| content_tokens(&s.text).into_iter().collect())
        .collect();
    let utterance_words: Vec<HashSet<String>> = input
        .transcript
        .utterances
        .iter()
        .map(|u| content_tokens(&u.text).into_iter().collect())
        .collect();

    let evidence: Vec<Evidence> = candidates
        .iter()
        .map(|candidate| gather(candidate, input, &sentence_words, &utterance_words))
        .collect();

    let weights = utterance_weights(input.transcript);
    let raw_time: Vec<f64> = evidence
        .iter()
        .map(|e| e.utterances.iter().map(|u| weights[*u]).sum())
        .collect();
    let total_time: f64 = raw_time.iter().sum();

    let mut topics: Vec<Topic> = candidates
        .into_iter()
        .zip(&evidence)
        .zip(&raw_time)
        .map(|((candidate, evidence), time)| Topic {
            context_sentences: evidence
                .context
                .iter()
                .take(input.settings.max_context_sentences)
                .map(|i| input.sentences[*i].text.clone())
                .collect(),
            time_share: if total_time > 0.0 { time / total_time } else { 0.0 },
            key_participants: key_participants(
                input.transcript,
                &evidence.utterances,
                input.settings.max_key_participants,
            ),
            related_topics: BTreeSet::new(),
            mentions: evidence.utterances.len(),
            relevance_score: candidate.relevance,
            label: candidate.label,
            method,
        })
        .collect();

    let threshold = input.settings.related_threshold;
    for i in 0..topics.len() {
        for j in (i + 1)..topics.len() {
            let similarity = overlap(&evidence[i].context, &evidence[j].context);
            if similarity > 0.0 && similarity >= threshold {
                let (left, right) = (topics[i].label.clone(), topics[j].label.clone());
                topics[i].related_topics.insert(right);
                topics[j].related_topics.insert(left);
            }
        }
    }

    topics
}

/// Drop duplicate labels, clean scores, sort by relevance, and cap the count
fn rank(candidates: Vec<Candidate>, num_topics: usize) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut ranked: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| seen.insert(c.label.to_lowercase()))
        .map(|mut c| {
            c.relevance = if c.relevance.is_finite() {
                c.relevance.clamp(0.0, 1.0)
            } else {
                0.0
            };
            c
        })
        .collect();

    // Stable, so tier order breaks ties
    ranked.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(num_topics);
    ranked
}

/// Context sentences and relevant utterances of one candidate.
/// Tiers that know their sentences use them; otherwise vocabulary decides.
fn gather(
    candidate: &Candidate,
    input: &TierInput<'_>,
    sentence_words: &[HashSet<String>],
    utterance_words: &[HashSet<String>],
) -> Evidence {
    if !candidate.sentences.is_empty() {
        let context: BTreeSet<usize> = candidate
            .sentences
            .iter()
            .copied()
            .filter(|i| *i < input.sentences.len())
            .collect();
        let utterances = context.iter().map(|i| input.sentences[*i].utterance).collect();
        return Evidence { context, utterances };
    }

    let touches = |words: &HashSet<String>| candidate.terms.iter().any(|t| words.contains(t));

    Evidence {
        context: sentence_words
            .iter()
            .enumerate()
            .filter(|(_, words)| touches(words))
            .map(|(i, _)| i)
            .collect(),
        utterances: utterance_words
            .iter()
            .enumerate()
            .filter(|(_, words)| touches(words))
            .map(|(i, _)| i)
            .collect(),
    }
}

/// Jaccard similarity of two context sets
fn overlap(a: &BTreeSet<usize>, b: &BTreeSet<usize>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Seconds per utterance when every utterance has a span, word counts otherwise
fn utterance_weights(transcript: &Transcript) -> Vec<f64> {
    if transcript.is_fully_timed() {
        let spans: Option<Vec<f64>> = (0..transcript.len())
            .map(|i| transcript.speaking_secs(i))
            .collect();

        if let Some(spans) = spans.filter(|s| s.iter().sum::<f64>() > 0.0) {
            return spans;
        }
    }

    transcript
        .utterances
        .iter()
        .map(|u| u.word_count() as f64)
        .collect()
}

fn key_participants(transcript: &Transcript, utterances: &BTreeSet<usize>, limit: usize) -> Vec<String> {
    // (speaker, count), in order of first relevant contribution
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for index in utterances {
        let Some(speaker) = transcript.utterances[*index].speaker.as_deref() else {
            continue;
        };
        match counts.iter_mut().find(|(name, _)| *name == speaker) {
            Some((_, count)) => *count += 1,
            None => counts.push((speaker, 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(speaker, _)| speaker.to_string())
        .collect()
}
