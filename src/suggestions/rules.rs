//! Threshold rules over efficiency metrics

use crate::config::SuggestionSettings;
use crate::efficiency::EfficiencyMetrics;
use crate::suggestions::models::{
    priority_from_severity, Suggestion, SuggestionCategory, SuggestionSource,
};
use crate::topics::Topic;

pub(crate) struct RuleContext<'a> {
    pub metrics: &'a EfficiencyMetrics,
    pub topics: Option<&'a [Topic]>,
    pub settings: &'a SuggestionSettings,
}

/// A rule that fired; severity in [0, 1] grows with the distance past its threshold
struct Finding {
    category: SuggestionCategory,
    text: String,
    reasoning: String,
    severity: f64,
}

type Rule = fn(&RuleContext<'_>) -> Option<Finding>;

/// Rule table, in tie-break order
const RULES: &[Rule] = &[
    participation_imbalance,
    single_voice,
    low_engagement,
    fast_pace,
    slow_pace,
    deadline_tracking,
    low_content_density,
    no_decisions,
    no_action_items,
    low_turn_rate,
    missing_agenda,
    missing_summary,
    too_many_topics,
];

/// Run every rule; fired rules come back in table order
pub(crate) fn evaluate(ctx: &RuleContext<'_>) -> Vec<Suggestion> {
    RULES
        .iter()
        .filter_map(|rule| rule(ctx))
        .map(|finding| Suggestion {
            category: finding.category,
            text: finding.text,
            reasoning: finding.reasoning,
            priority: priority_from_severity(finding.severity),
            source: SuggestionSource::Rule,
        })
        .collect()
}

/// How far `value` sits below `threshold`, as a fraction of the threshold
fn shortfall(value: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return 0.0;
    }
    ((threshold - value) / threshold).clamp(0.0, 1.0)
}

fn has_structure_evidence(ctx: &RuleContext<'_>) -> bool {
    ctx.metrics.sentence_count >= ctx.settings.structure_min_sentences
}

fn participation_imbalance(ctx: &RuleContext<'_>) -> Option<Finding> {
    let m = ctx.metrics;
    let low_water = ctx.settings.balance_low_water;
    if m.speaker_count < 2 || m.participation_balance >= low_water {
        return None;
    }

    let dominant = m.dominant_speakers();
    let names = if dominant.is_empty() {
        "a few voices".to_string()
    } else {
        dominant.join(" and ")
    };
    let top_share: f64 = dominant
        .iter()
        .filter_map(|name| m.speaker_shares.get(*name))
        .sum();

    Some(Finding {
        category: SuggestionCategory::Participation,
        text: format!(
            "Balance the conversation: {} carried most of it, so invite quieter participants to weigh in.",
            names
        ),
        reasoning: format!(
            "Participation balance was {:.2} (target at least {:.2}); {} spoke {:.0}% of the words.",
            m.participation_balance,
            low_water,
            names,
            top_share * 100.0
        ),
        severity: shortfall(m.participation_balance, low_water),
    })
}

fn single_voice(ctx: &RuleContext<'_>) -> Option<Finding> {
    let m = ctx.metrics;
    if m.speaker_count != 1 || m.word_count == 0 {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::Participation,
        text: "Only one speaker was recorded; if this was a meeting, make room for others to contribute or share it as an update instead.".to_string(),
        reasoning: "All attributed words came from a single speaker.".to_string(),
        severity: 0.6,
    })
}

fn low_engagement(ctx: &RuleContext<'_>) -> Option<Finding> {
    let m = ctx.metrics;
    let low_water = ctx.settings.engagement_low_water;
    if m.speaker_count < 2 || m.engagement_score >= low_water {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::Participation,
        text: "Encourage back-and-forth discussion with direct questions and round-robin check-ins.".to_string(),
        reasoning: format!(
            "Engagement scored {:.0}/100 (target at least {:.0}) with {} turns.",
            m.engagement_score, low_water, m.speaker_turn_count
        ),
        severity: shortfall(m.engagement_score, low_water),
    })
}

fn fast_pace(ctx: &RuleContext<'_>) -> Option<Finding> {
    let m = ctx.metrics;
    let high_water = ctx.settings.wpm_high_water;
    if high_water <= 0.0 || m.words_per_minute <= high_water {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::TimeManagement,
        text: "Slow the pace down: pause between agenda items and check that points have landed.".to_string(),
        reasoning: format!(
            "Speaking pace averaged {:.0} words per minute, above {:.0}.",
            m.words_per_minute, high_water
        ),
        severity: ((m.words_per_minute - high_water) / high_water).clamp(0.0, 1.0),
    })
}

/// Only trusted with real timing; an estimated duration just echoes the assumed rate
fn slow_pace(ctx: &RuleContext<'_>) -> Option<Finding> {
    let m = ctx.metrics;
    let low_water = ctx.settings.wpm_low_water;
    if !m.duration_source.is_measured()
        || m.words_per_minute <= 0.0
        || m.words_per_minute >= low_water
    {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::TimeManagement,
        text: "Tighten the meeting: long silences or slow stretches suggest it could be shorter or timeboxed.".to_string(),
        reasoning: format!(
            "Speaking pace averaged {:.0} words per minute over {:.1} minutes, below {:.0}.",
            m.words_per_minute,
            m.duration_minutes(),
            low_water
        ),
        severity: shortfall(m.words_per_minute, low_water),
    })
}

fn deadline_tracking(ctx: &RuleContext<'_>) -> Option<Finding> {
    let deadlines = &ctx.metrics.deadline_mentions;
    if deadlines.is_empty() {
        return None;
    }

    let list = deadlines.join(", ");
    Some(Finding {
        category: SuggestionCategory::TimeManagement,
        text: format!(
            "Record the deadlines mentioned ({}) with a named owner for each, and confirm them in the minutes.",
            list
        ),
        reasoning: format!(
            "{} deadline(s) came up in discussion: {}.",
            deadlines.len(),
            list
        ),
        severity: (0.5 + 0.1 * deadlines.len() as f64).min(0.9),
    })
}

fn low_content_density(ctx: &RuleContext<'_>) -> Option<Finding> {
    let m = ctx.metrics;
    let low_water = ctx.settings.content_density_low_water;
    if m.sentence_count == 0 || m.content_density >= low_water {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::Content,
        text: "Capture decisions and action items explicitly: state who does what by when before moving on.".to_string(),
        reasoning: format!(
            "Only {:.0}% of sentences carried an action item or decision (target at least {:.0}%).",
            m.content_density * 100.0,
            low_water * 100.0
        ),
        severity: shortfall(m.content_density, low_water),
    })
}

fn no_decisions(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !has_structure_evidence(ctx) || ctx.metrics.decision_count > 0 {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::Content,
        text: "Close each discussion with an explicit decision, even if the decision is to defer.".to_string(),
        reasoning: format!(
            "No decisions were recorded across {} sentences.",
            ctx.metrics.sentence_count
        ),
        severity: 0.5,
    })
}

fn no_action_items(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !has_structure_evidence(ctx) || ctx.metrics.action_item_count > 0 {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::Content,
        text: "End with concrete next steps and assign an owner to each.".to_string(),
        reasoning: format!(
            "No action items were detected across {} sentences.",
            ctx.metrics.sentence_count
        ),
        severity: 0.6,
    })
}

fn low_turn_rate(ctx: &RuleContext<'_>) -> Option<Finding> {
    let m = ctx.metrics;
    let minutes = m.duration_minutes();
    let minimum = ctx.settings.min_turns_per_minute;
    if minutes < ctx.settings.min_minutes_for_turn_rule || minutes <= 0.0 {
        return None;
    }

    let rate = m.speaker_turn_count as f64 / minutes;
    if rate >= minimum {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::Structure,
        text: "Break long monologues into shorter, more frequent contributions, for example by pausing for questions after each point.".to_string(),
        reasoning: format!(
            "{} speaker turns in {:.1} minutes is {:.2} per minute (target at least {:.2}).",
            m.speaker_turn_count, minutes, rate, minimum
        ),
        severity: shortfall(rate, minimum),
    })
}

fn missing_agenda(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !has_structure_evidence(ctx) || ctx.metrics.has_agenda {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::Structure,
        text: "Open with a short agenda so everyone knows what the meeting needs to cover.".to_string(),
        reasoning: "No agenda was mentioned during the meeting.".to_string(),
        severity: 0.3,
    })
}

fn missing_summary(ctx: &RuleContext<'_>) -> Option<Finding> {
    if !has_structure_evidence(ctx) || ctx.metrics.has_summary {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::Structure,
        text: "Finish with a quick recap of decisions and owners.".to_string(),
        reasoning: "The meeting ended without a summary or recap.".to_string(),
        severity: 0.25,
    })
}

fn too_many_topics(ctx: &RuleContext<'_>) -> Option<Finding> {
    let topics = ctx.topics?;
    let limit = ctx.settings.max_topics_before_split;
    if limit == 0 || topics.len() <= limit {
        return None;
    }

    Some(Finding {
        category: SuggestionCategory::Structure,
        text: "Split this meeting: it covered more topics than one session can handle well.".to_string(),
        reasoning: format!(
            "{} distinct topics were discussed (more than {}).",
            topics.len(),
            limit
        ),
        severity: ((topics.len() - limit) as f64 / limit as f64).clamp(0.0, 1.0),
    })
}
