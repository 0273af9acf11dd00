//! Linguistic markers for commitments, decisions, deadlines, and structure

use crate::text::tokens;

/// Modal commitments and action phrases
const ACTION_PHRASES: &[&str] = &[
    "action item", "assign", "assigned", "deadline", "due", "follow up", "going to", "has to",
    "have to", "i'll", "let's", "must", "need to", "needs to", "owner", "responsible for",
    "should", "take care of", "to do", "we'll", "will", "you'll",
];

/// Verbs that open an imperative sentence ("Send the deck to finance.")
const IMPERATIVE_VERBS: &[&str] = &[
    "book", "call", "check", "circulate", "complete", "confirm", "create", "draft", "email",
    "finalize", "fix", "follow", "make", "prepare", "review", "schedule", "send", "set", "share",
    "submit", "update", "write",
];

const DECISION_PHRASES: &[&str] = &[
    "agree", "agreed", "approve", "approved", "concluded", "decide", "decided", "decision",
    "go with", "resolved", "settled on",
];

const SUMMARY_PHRASES: &[&str] = &[
    "recap", "summarise", "summarize", "summary", "to sum up", "wrap up",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

const DEADLINE_PHRASES: &[&str] = &[
    "end of day", "end of the day", "end of the month", "end of the quarter", "end of the week",
    "end of week", "eod", "eow", "next month", "next week", "tomorrow", "tonight",
];

/// Lowercase tokens joined by single spaces and padded, for phrase lookup
fn normalized(text: &str) -> String {
    format!(" {} ", tokens(text).join(" "))
}

fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    let phrase = format!(" {} ", tokens(phrase).join(" "));
    !phrase.trim().is_empty() && normalized.contains(&phrase)
}

/// Whether a sentence commits someone to an action.
/// `extra` holds caller-supplied markers, e.g. action items from minutes extraction.
pub fn is_action_sentence(sentence: &str, extra: &[String]) -> bool {
    let text = normalized(sentence);

    if ACTION_PHRASES.iter().any(|p| contains_phrase(&text, p)) {
        return true;
    }

    let opens_imperative = tokens(sentence)
        .first()
        .is_some_and(|first| IMPERATIVE_VERBS.contains(&first.as_str()));
    if opens_imperative {
        return true;
    }

    extra.iter().any(|marker| contains_phrase(&text, marker))
}

/// Whether a sentence records a decision
pub fn is_decision_sentence(sentence: &str) -> bool {
    let text = normalized(sentence);
    DECISION_PHRASES.iter().any(|p| contains_phrase(&text, p))
}

pub fn mentions_agenda(text: &str) -> bool {
    contains_phrase(&normalized(text), "agenda")
}

pub fn mentions_summary(text: &str) -> bool {
    let text = normalized(text);
    SUMMARY_PHRASES.iter().any(|p| contains_phrase(&text, p))
}

/// Deadlines mentioned in the text, in order of first mention, without repeats.
/// Weekdays come back capitalized ("Friday"), abbreviations upper-cased ("EOD").
pub fn deadline_mentions(text: &str) -> Vec<String> {
    let words = tokens(text);
    let joined = normalized(text);
    let mut found: Vec<(usize, String)> = Vec::new();

    for (position, word) in words.iter().enumerate() {
        if WEEKDAYS.contains(&word.as_str()) {
            found.push((position, capitalize(word)));
        }
    }

    for phrase in DEADLINE_PHRASES {
        let needle = format!(" {} ", phrase);
        if let Some(offset) = joined.find(&needle) {
            // Token position of the match, for ordering against weekdays
            let position = joined[..offset].split_whitespace().count();
            let label = if phrase.len() == 3 {
                phrase.to_uppercase()
            } else {
                phrase.to_string()
            };
            found.push((position, label));
        }
    }

    found.sort_by_key(|(position, _)| *position);

    let mut mentions: Vec<String> = Vec::new();
    for (_, label) in found {
        // Repeated weekdays collapse to their first mention
        if !mentions.iter().any(|m| m.eq_ignore_ascii_case(&label)) {
            mentions.push(label);
        }
    }
    mentions
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
