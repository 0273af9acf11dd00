//! Data models for suggestions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Highest priority (most important)
pub const PRIORITY_HIGHEST: u8 = 1;

/// Lowest priority
pub const PRIORITY_LOWEST: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    Structure,
    Participation,
    Content,
    TimeManagement,
}

impl SuggestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionCategory::Structure => "structure",
            SuggestionCategory::Participation => "participation",
            SuggestionCategory::Content => "content",
            SuggestionCategory::TimeManagement => "time_management",
        }
    }

    /// Lenient parse of a category name ("Time management", "time-management", "pacing")
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "structure" | "agenda" | "organization" | "organisation" => {
                Some(SuggestionCategory::Structure)
            }
            "participation" | "engagement" | "inclusion" => Some(SuggestionCategory::Participation),
            "content" | "decisions" | "action_items" | "outcomes" => Some(SuggestionCategory::Content),
            "time_management" | "time" | "timing" | "pacing" | "timemanagement" => {
                Some(SuggestionCategory::TimeManagement)
            }
            _ => None,
        }
    }
}

impl fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Rule,
    Llm,
}

/// One actionable improvement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: SuggestionCategory,
    pub text: String,
    pub reasoning: String,
    /// 1 (most important) to 5
    pub priority: u8,
    pub source: SuggestionSource,
}

/// Caller preferences; they shape selection and wording, never the rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPreferences {
    /// Keep only these categories; empty keeps all
    #[serde(default)]
    pub preferred_categories: BTreeSet<SuggestionCategory>,

    /// Cap on the number of suggestions returned
    #[serde(default)]
    pub max_suggestions: Option<usize>,

    /// Reader's role ("manager", "facilitator", "participant")
    #[serde(default)]
    pub role: Option<String>,
}

impl SuggestionPreferences {
    pub fn only(categories: impl IntoIterator<Item = SuggestionCategory>) -> Self {
        Self {
            preferred_categories: categories.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = Some(max);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn allows(&self, category: SuggestionCategory) -> bool {
        self.preferred_categories.is_empty() || self.preferred_categories.contains(&category)
    }
}

/// Suggestions plus what happened to the LLM tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionReport {
    pub suggestions: Vec<Suggestion>,

    /// The oracle contributed (even if all its suggestions were duplicates)
    pub llm_used: bool,

    /// Why the LLM tier was requested but gave nothing usable
    pub llm_error: Option<String>,
}

/// Map a rule's severity in [0, 1] to a priority; more severe ranks higher
pub(crate) fn priority_from_severity(severity: f64) -> u8 {
    let severity = if severity.is_finite() {
        severity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let span = f64::from(PRIORITY_LOWEST - PRIORITY_HIGHEST);
    PRIORITY_HIGHEST + ((1.0 - severity) * span).round() as u8
}
