//! Efficiency metrics for minutes-analytics
//!
//! Pure transcript scanning: counts, pacing, participation balance,
//! engagement, and content density, folded into one weighted score and
//! a qualitative rating.
//! Nothing here depends on clustering or the oracle, so this analyzer
//! never degrades.

mod analyzer;
mod metrics;
mod report;

pub use analyzer::EfficiencyAnalyzer;
pub use metrics::{Comparison, DurationSource, EfficiencyMetrics};
pub use report::{EfficiencyRating, EfficiencyReport};
