//! Transcript module for minutes-analytics
//!
//! The normalized, read-only transcript every analyzer consumes.

mod models;

pub use models::{Transcript, Utterance, UNATTRIBUTED};
