//! Word tokenizing

use std::collections::HashSet;

use crate::text::is_stopword;

/// Lowercase word tokens; apostrophes inside words are kept ("let's")
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|word| word.trim_matches('\'').to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Tokens that can name a topic: no stopwords, no bare numbers, no single letters.
/// Possessive "'s" is stripped so "team's" and "team" count together.
pub fn content_tokens(text: &str) -> Vec<String> {
    tokens(text)
        .into_iter()
        .filter(|token| !is_stopword(token))
        .map(|token| match token.strip_suffix("'s") {
            Some(stem) => stem.to_string(),
            None => token,
        })
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| token.chars().any(char::is_alphabetic))
        .filter(|token| !is_stopword(token))
        .collect()
}

/// Jaccard similarity of two sets; 0 when both are empty
pub fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
