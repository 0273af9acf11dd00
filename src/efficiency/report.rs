//! Qualitative reading of efficiency metrics

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ReportThresholds;
use crate::efficiency::metrics::EfficiencyMetrics;

/// Overall verdict derived from the 0-100 efficiency score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyRating {
    Excellent,
    Good,
    Fair,
    #[default]
    Poor,
}

impl EfficiencyRating {
    pub fn from_score(score: f64, thresholds: &ReportThresholds) -> Self {
        if score >= thresholds.excellent_score {
            EfficiencyRating::Excellent
        } else if score >= thresholds.good_score {
            EfficiencyRating::Good
        } else if score >= thresholds.fair_score {
            EfficiencyRating::Fair
        } else {
            EfficiencyRating::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EfficiencyRating::Excellent => "excellent",
            EfficiencyRating::Good => "good",
            EfficiencyRating::Fair => "fair",
            EfficiencyRating::Poor => "poor",
        }
    }
}

impl fmt::Display for EfficiencyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating plus what went well and what did not
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyReport {
    pub rating: EfficiencyRating,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Judge each dimension against its threshold. `pace_score` is the 0-1
/// banded pace used by the overall score.
pub(crate) fn assess(
    metrics: &EfficiencyMetrics,
    pace_score: f64,
    thresholds: &ReportThresholds,
) -> EfficiencyReport {
    let mut report = EfficiencyReport {
        rating: EfficiencyRating::from_score(metrics.overall_efficiency_score, thresholds),
        ..Default::default()
    };

    let dimensions = [
        (
            metrics.participation_balance >= thresholds.strong_balance,
            "Well-balanced participation",
            "Unbalanced participation",
        ),
        (
            metrics.engagement_score >= thresholds.strong_engagement,
            "High engagement level",
            "Low engagement level",
        ),
        (
            metrics.has_agenda || metrics.has_summary,
            "Clear meeting structure",
            "No agenda or summary",
        ),
        (
            metrics.content_density >= thresholds.strong_content_density,
            "High content density",
            "Low content density",
        ),
        (
            pace_score >= thresholds.strong_pace,
            "Efficient use of time",
            "Inefficient use of time",
        ),
    ];

    for (strong, strength, weakness) in dimensions {
        if strong {
            report.strengths.push(strength.to_string());
        } else {
            report.weaknesses.push(weakness.to_string());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_cutoffs() {
        let thresholds = ReportThresholds::default();
        assert_eq!(EfficiencyRating::from_score(80.0, &thresholds), EfficiencyRating::Excellent);
        assert_eq!(EfficiencyRating::from_score(79.9, &thresholds), EfficiencyRating::Good);
        assert_eq!(EfficiencyRating::from_score(60.0, &thresholds), EfficiencyRating::Good);
        assert_eq!(EfficiencyRating::from_score(40.0, &thresholds), EfficiencyRating::Fair);
        assert_eq!(EfficiencyRating::from_score(12.0, &thresholds), EfficiencyRating::Poor);
    }

    #[test]
    fn custom_cutoffs_apply() {
        let thresholds = ReportThresholds {
            excellent_score: 95.0,
            ..Default::default()
        };
        assert_eq!(EfficiencyRating::from_score(90.0, &thresholds), EfficiencyRating::Good);
    }

    #[test]
    fn every_dimension_lands_on_one_side() {
        let metrics = EfficiencyMetrics {
            participation_balance: 0.9,
            engagement_score: 40.0,
            content_density: 0.8,
            has_summary: true,
            overall_efficiency_score: 65.0,
            ..Default::default()
        };
        let report = assess(&metrics, 0.3, &ReportThresholds::default());

        assert_eq!(report.rating, EfficiencyRating::Good);
        assert_eq!(
            report.strengths,
            vec!["Well-balanced participation", "Clear meeting structure", "High content density"]
        );
        assert_eq!(report.weaknesses, vec!["Low engagement level", "Inefficient use of time"]);
    }

    #[test]
    fn rating_serializes_lowercase() {
        assert_eq!(serde_json::to_value(EfficiencyRating::Fair).unwrap(), "fair");
        assert_eq!(EfficiencyRating::Excellent.to_string(), "excellent");
    }
}
