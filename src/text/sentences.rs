//! Sentence splitting

use crate::transcript::Transcript;

/// Fragments shorter than this (in alphanumeric chars) never end a sentence
const MIN_SENTENCE_CHARS: usize = 3;

/// Words whose trailing period is not a sentence boundary
const ABBREVIATIONS: &[&str] = &[
    "approx", "corp", "dept", "dr", "e.g", "eg", "est", "etc", "fig", "i.e", "ie", "inc", "jr",
    "ltd", "mr", "mrs", "ms", "prof", "sr", "vs",
];

/// Abbreviations only when a number follows ("No. 5"); otherwise ordinary words
const NUMBER_ABBREVIATIONS: &[&str] = &["no", "nos", "vol"];

/// Abbreviations only when more text follows ("St. Louis", "Acme Co. about")
const NAME_ABBREVIATIONS: &[&str] = &["co", "st"];

/// A sentence together with the utterance it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    /// Index of the source utterance in the transcript
    pub utterance: usize,

    /// Speaker of the source utterance
    pub speaker: Option<String>,

    /// Sentence text, trimmed
    pub text: String,
}

/// Split text on terminal punctuation, guarding against abbreviations,
/// initials, and decimal numbers.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        current.push(c);

        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let at_boundary = chars.get(i + 1).map_or(true, |next| next.is_whitespace());
        let following = chars[i + 1..].iter().copied().find(|c| !c.is_whitespace());
        if at_boundary && ends_sentence(&current, c, following) {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if rest.chars().any(char::is_alphanumeric) {
        sentences.push(rest.to_string());
    }

    sentences
}

/// `following` is the first non-blank character after the terminator
fn ends_sentence(fragment: &str, terminator: char, following: Option<char>) -> bool {
    let body = fragment.trim().trim_end_matches(['.', '!', '?']);

    if body.chars().filter(|c| c.is_alphanumeric()).count() < MIN_SENTENCE_CHARS {
        return false;
    }

    if terminator != '.' {
        return true;
    }

    let last_word = body
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    let word = last_word.as_str();
    if ABBREVIATIONS.contains(&word) {
        return false;
    }
    if NUMBER_ABBREVIATIONS.contains(&word) && following.is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    if NAME_ABBREVIATIONS.contains(&word) && following.is_some_and(char::is_alphanumeric) {
        return false;
    }

    // A lone capital letter is an initial ("J. Smith")
    let mut letters = last_word.chars();
    !matches!((letters.next(), letters.next()), (Some(c), None) if c.is_alphabetic())
}

/// All sentences of a transcript, in order, tagged with their utterance
pub fn transcript_sentences(transcript: &Transcript) -> Vec<Sentence> {
    transcript
        .utterances
        .iter()
        .enumerate()
        .flat_map(|(index, utterance)| {
            split_sentences(&utterance.text)
                .into_iter()
                .map(move |text| Sentence {
                    utterance: index,
                    speaker: utterance.speaker.clone(),
                    text,
                })
        })
        .collect()
}
