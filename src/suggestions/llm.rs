//! LLM tier: free-form suggestions from the oracle

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write;
use std::time::Duration;

use crate::efficiency::EfficiencyMetrics;
use crate::oracle::{self, parse, prompts, Oracle};
use crate::suggestions::models::{Suggestion, SuggestionCategory, SuggestionSource};
use crate::text::{content_tokens, jaccard};
use crate::topics::Topic;
use crate::Result;

/// Most suggestions taken from one completion
const MAX_LLM_SUGGESTIONS: usize = 5;

/// Topic labels included in the prompt
const PROMPT_TOPICS: usize = 5;

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    suggestions: Vec<ResponseSuggestion>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponseSuggestion {
    Bare(String),
    Detailed {
        #[serde(default)]
        category: Option<String>,
        #[serde(alias = "suggestion")]
        text: String,
        #[serde(default)]
        reasoning: Option<String>,
        #[serde(default)]
        priority: Option<Value>,
    },
}

pub(crate) async fn suggest(
    oracle: &dyn Oracle,
    metrics: &EfficiencyMetrics,
    topics: Option<&[Topic]>,
    timeout: Duration,
) -> Result<Vec<Suggestion>> {
    let labels: Vec<String> = topics
        .unwrap_or_default()
        .iter()
        .take(PROMPT_TOPICS)
        .map(|t| t.label.clone())
        .collect();
    let prompt = prompts::build_suggestion_prompt(&summarize_metrics(metrics), &labels);

    let completion = oracle::ask(oracle, &prompt, timeout).await?;
    let response: SuggestionResponse = parse::parse_embedded(&completion)?;

    Ok(to_suggestions(response, oracle.name()))
}

/// One `name: value` line per metric, for the prompt
fn summarize_metrics(metrics: &EfficiencyMetrics) -> String {
    let mut summary = String::new();
    for (name, value) in metrics.numeric_fields() {
        let _ = writeln!(summary, "- {}: {:.2}", name, value);
    }
    let _ = writeln!(summary, "- duration_source: {:?}", metrics.duration_source);
    let _ = writeln!(summary, "- has_agenda: {}", metrics.has_agenda);
    let _ = writeln!(summary, "- has_summary: {}", metrics.has_summary);
    let _ = writeln!(summary, "- rating: {}", metrics.report.rating);
    if !metrics.report.weaknesses.is_empty() {
        let _ = writeln!(summary, "- weaknesses: {}", metrics.report.weaknesses.join(", "));
    }
    if !metrics.deadline_mentions.is_empty() {
        let _ = writeln!(
            summary,
            "- deadlines mentioned: {}",
            metrics.deadline_mentions.join(", ")
        );
    }
    summary
}

fn to_suggestions(response: SuggestionResponse, oracle_name: &str) -> Vec<Suggestion> {
    response
        .suggestions
        .into_iter()
        .filter_map(|item| {
            let (category, text, reasoning, priority) = match item {
                ResponseSuggestion::Bare(text) => (None, text, None, None),
                ResponseSuggestion::Detailed {
                    category,
                    text,
                    reasoning,
                    priority,
                } => (category, text, reasoning, priority),
            };

            let text = text.trim().to_string();
            if text.is_empty() {
                return None;
            }

            let category = category
                .as_deref()
                .and_then(SuggestionCategory::from_label)
                .unwrap_or_else(|| guess_category(&text));
            let priority = priority
                .as_ref()
                .and_then(parse_priority)
                .unwrap_or_else(|| keyword_priority(&text));
            let reasoning = reasoning
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| format!("Suggested by {} from the meeting metrics.", oracle_name));

            Some(Suggestion {
                category,
                text,
                reasoning,
                priority,
                source: SuggestionSource::Llm,
            })
        })
        .take(MAX_LLM_SUGGESTIONS)
        .collect()
}

/// Numbers are clamped to 1-5; "high", "medium", and "low" are accepted too
fn parse_priority(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_f64().filter(|p| p.is_finite()).map(|p| p.round().clamp(1.0, 5.0) as u8),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "critical" | "urgent" => Some(1),
            "high" => Some(2),
            "medium" | "normal" => Some(3),
            "low" => Some(4),
            other => other.parse::<f64>().ok().map(|p| p.round().clamp(1.0, 5.0) as u8),
        },
        _ => None,
    }
}

fn keyword_priority(text: &str) -> u8 {
    let lower = text.to_lowercase();
    if ["critical", "urgent", "immediately"].iter().any(|k| lower.contains(k)) {
        2
    } else if ["consider", "could", "might", "optionally"].iter().any(|k| lower.contains(k)) {
        4
    } else {
        3
    }
}

fn guess_category(text: &str) -> SuggestionCategory {
    let lower = text.to_lowercase();
    let mentions = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));

    if mentions(&["agenda", "structure", "recap", "format"]) {
        SuggestionCategory::Structure
    } else if mentions(&["particip", "speak", "voice", "engag", "quiet"]) {
        SuggestionCategory::Participation
    } else if mentions(&["time", "pace", "deadline", "minute", "schedule"]) {
        SuggestionCategory::TimeManagement
    } else {
        SuggestionCategory::Content
    }
}

/// Drop LLM suggestions that restate a rule suggestion
pub(crate) fn drop_duplicates(
    llm: Vec<Suggestion>,
    rules: &[Suggestion],
    threshold: f64,
) -> Vec<Suggestion> {
    let rule_words: Vec<HashSet<String>> = rules
        .iter()
        .map(|s| content_tokens(&s.text).into_iter().collect())
        .collect();

    llm.into_iter()
        .filter(|candidate| {
            let words: HashSet<String> = content_tokens(&candidate.text).into_iter().collect();
            !rule_words.iter().any(|rule| jaccard(&words, rule) >= threshold)
        })
        .collect()
}
