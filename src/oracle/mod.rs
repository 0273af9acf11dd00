//! LLM oracle for minutes-analytics
//!
//! A best-effort advisory capability: analyzers ask it for topics and
//! suggestions, and fall back to their deterministic paths whenever it is
//! absent, slow, or talking nonsense.

mod client;
mod gemini;
mod ollama;
pub mod parse;
pub mod prompts;

pub use client::{ask, build_oracle, Oracle};
pub use gemini::GeminiOracle;
pub use ollama::OllamaOracle;
