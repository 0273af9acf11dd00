//! Text processing shared by the analyzers
//!
//! Sentence splitting, tokenizing, the static stopword list, and the
//! linguistic markers used to spot commitments, decisions, and deadlines.

pub mod markers;
mod sentences;
mod stopwords;
mod tokenize;

pub use sentences::{split_sentences, transcript_sentences, Sentence};
pub use stopwords::is_stopword;
pub use tokenize::{content_tokens, jaccard, tokens};
