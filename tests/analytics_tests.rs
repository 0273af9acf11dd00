mod common;

use anyhow::Result;

use minutes_analytics::{
    AnalysisOptions, Component, ComponentStatus, MeetingAnalytics, Settings, SuggestionCategory,
    SuggestionPreferences, TopicCapabilities, TopicMethod, Transcript, Utterance,
};

fn analytics() -> MeetingAnalytics {
    MeetingAnalytics::new(Settings::default())
}

#[tokio::test]
async fn budget_sync_end_to_end() -> Result<()> {
    let result = analytics()
        .analyze(&common::budget_sync(), &AnalysisOptions::default())
        .await?;

    let metrics = &result.metrics;
    assert_eq!(metrics.speaker_turn_count, 3);
    assert_eq!(metrics.word_count, 20);
    assert_eq!(metrics.estimated_duration_secs, 25.0);
    assert!(metrics.participation_balance > 0.0);
    assert!(metrics.participation_balance < 1.0);

    let deadline = result
        .suggestions
        .iter()
        .find(|s| {
            matches!(
                s.category,
                SuggestionCategory::TimeManagement | SuggestionCategory::Content
            ) && s.text.contains("Friday")
        })
        .expect("a suggestion should reference the Friday deadline");
    assert_eq!(deadline.priority, result.suggestions[0].priority);

    let budget = result
        .topics
        .iter()
        .find(|t| {
            let label = t.label.to_lowercase();
            label.contains("budget") || label.contains("q4")
        })
        .expect("a budget topic should be identified");
    assert_eq!(budget.key_participants.first().map(String::as_str), Some("A"));

    Ok(())
}

#[tokio::test]
async fn empty_transcript_yields_zeroes_and_skipped_topics() -> Result<()> {
    let result = analytics()
        .analyze(&Transcript::default(), &AnalysisOptions::default())
        .await?;

    assert_eq!(result.metrics.word_count, 0);
    assert_eq!(result.metrics.sentence_count, 0);
    assert_eq!(result.metrics.speaker_turn_count, 0);
    assert_eq!(result.metrics.estimated_duration_secs, 0.0);
    assert_eq!(result.metrics.overall_efficiency_score, 0.0);
    assert!(result.topics.is_empty());
    assert_eq!(result.topic_method, TopicMethod::Skipped);
    assert_eq!(result.status_of(Component::Topics), ComponentStatus::Skipped);
    assert!(result.suggestions.is_empty());

    Ok(())
}

#[tokio::test]
async fn single_speaker_has_zero_balance() -> Result<()> {
    let result = analytics()
        .analyze(&common::monologue(), &AnalysisOptions::default())
        .await?;

    assert_eq!(result.metrics.participation_balance, 0.0);
    assert_eq!(result.metrics.speaker_turn_count, 1);
    assert!(result
        .suggestions
        .iter()
        .any(|s| s.category == SuggestionCategory::Participation));

    Ok(())
}

#[tokio::test]
async fn topics_are_capped_and_sorted() -> Result<()> {
    let transcripts = [
        common::budget_sync(),
        common::hiring_and_budget(),
        common::monologue(),
    ];

    for transcript in &transcripts {
        for num_topics in 1..=4 {
            let options = AnalysisOptions::default().with_num_topics(num_topics);
            let result = analytics().analyze(transcript, &options).await?;

            assert!(result.topics.len() <= num_topics);
            assert!(result
                .topics
                .windows(2)
                .all(|w| w[0].relevance_score >= w[1].relevance_score));
            assert!(result
                .topics
                .iter()
                .all(|t| (0.0..=1.0).contains(&t.relevance_score)));
        }
    }

    Ok(())
}

#[cfg(feature = "clustering")]
#[tokio::test]
async fn clustering_is_the_preferred_offline_tier() -> Result<()> {
    let options = AnalysisOptions::default().with_num_topics(2);
    let result = analytics()
        .analyze(&common::hiring_and_budget(), &options)
        .await?;

    assert_eq!(result.topic_method, TopicMethod::Clustering);
    assert_eq!(result.status_of(Component::Topics), ComponentStatus::Ok);
    assert_eq!(result.topics.len(), 2);

    let shares: f64 = result.topics.iter().map(|t| t.time_share).sum();
    assert!((shares - 1.0).abs() < 1e-9);

    let hiring = result
        .topics
        .iter()
        .find(|t| t.label.contains("hiring") || t.label.contains("pipeline"))
        .expect("hiring cluster");
    assert_eq!(hiring.key_participants, vec!["Ana"]);

    Ok(())
}

#[tokio::test]
async fn analysis_is_idempotent() -> Result<()> {
    let analytics = analytics();
    let options = AnalysisOptions::default();
    let transcript = common::hiring_and_budget();

    let first = analytics.analyze(&transcript, &options).await?;
    let second = analytics.analyze(&transcript, &options).await?;

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.suggestions, second.suggestions);
    assert_eq!(first.topics, second.topics);
    assert_eq!(first.status, second.status);

    Ok(())
}

#[tokio::test]
async fn preferred_categories_filter_suggestions() -> Result<()> {
    let options = AnalysisOptions::default().with_preferences(SuggestionPreferences::only([
        SuggestionCategory::TimeManagement,
    ]));
    let result = analytics().analyze(&common::budget_sync(), &options).await?;

    assert!(!result.suggestions.is_empty());
    assert!(result
        .suggestions
        .iter()
        .all(|s| s.category == SuggestionCategory::TimeManagement));

    Ok(())
}

#[tokio::test]
async fn max_suggestions_and_role_shape_output() -> Result<()> {
    let preferences = SuggestionPreferences::default()
        .with_max_suggestions(1)
        .with_role("facilitator");
    let options = AnalysisOptions::default().with_preferences(preferences);
    let result = analytics().analyze(&common::budget_sync(), &options).await?;

    assert_eq!(result.suggestions.len(), 1);
    assert!(result.suggestions[0].reasoning.contains("As the facilitator"));

    Ok(())
}

#[tokio::test]
async fn everything_optional_disabled_still_returns_full_result() -> Result<()> {
    let analytics = analytics().with_capabilities(TopicCapabilities::none());
    let options = AnalysisOptions::default().with_llm(true);

    let result = analytics.analyze(&common::budget_sync(), &options).await?;

    assert_eq!(result.topic_method, TopicMethod::Keyword);
    assert_eq!(result.status_of(Component::Topics), ComponentStatus::Degraded);
    assert_eq!(result.status_of(Component::Efficiency), ComponentStatus::Ok);
    assert_eq!(result.status_of(Component::Suggestions), ComponentStatus::Degraded);
    assert_eq!(
        result.degraded_components(),
        vec![Component::Topics, Component::Suggestions]
    );
    assert!(!result.topics.is_empty());
    assert!(!result.suggestions.is_empty());
    assert_eq!(result.metrics.word_count, 20);

    Ok(())
}

#[tokio::test]
async fn split_rule_needs_more_topics_than_the_threshold() -> Result<()> {
    let analytics = analytics().with_capabilities(TopicCapabilities::none());
    let transcript = Transcript::new(vec![Utterance::new(
        "Budget, hiring, roadmap, pricing, security, marketing, onboarding, infrastructure, \
         analytics, compliance.",
    )
    .spoken_by("A")]);
    let splits = |result: &minutes_analytics::AnalyticsResult| {
        result
            .suggestions
            .iter()
            .filter(|s| s.text.starts_with("Split"))
            .count()
    };

    // The default topic cap sits below the split threshold
    let capped = analytics
        .analyze(&transcript, &AnalysisOptions::default())
        .await?;
    assert_eq!(capped.topics.len(), 5);
    assert_eq!(splits(&capped), 0);

    let wide = analytics
        .analyze(&transcript, &AnalysisOptions::default().with_num_topics(9))
        .await?;
    assert_eq!(wide.topics.len(), 9);
    assert_eq!(splits(&wide), 1);

    Ok(())
}

#[tokio::test]
async fn baseline_adds_comparison() -> Result<()> {
    let analytics = analytics();
    let baseline = analytics
        .analyze(&common::budget_sync(), &AnalysisOptions::default())
        .await?
        .metrics;
    assert!(baseline.comparison.is_none());

    let options = AnalysisOptions::default().with_baseline(baseline.clone());
    let result = analytics.analyze(&common::monologue(), &options).await?;

    let comparison = result.metrics.comparison.expect("comparison with baseline");
    assert_eq!(
        comparison.deltas["speaker_turn_count"],
        result.metrics.speaker_turn_count as f64 - baseline.speaker_turn_count as f64
    );
    assert!(comparison
        .regressed
        .contains(&"participation_balance".to_string()));

    Ok(())
}

#[tokio::test]
async fn external_markers_count_as_content() -> Result<()> {
    let transcript = Transcript::new(vec![
        Utterance::new("The vendor contract came up again.").spoken_by("A"),
        Utterance::new("Weather was nice.").spoken_by("B"),
    ]);

    let plain = analytics()
        .analyze(&transcript, &AnalysisOptions::default())
        .await?;
    let marked = analytics()
        .analyze(
            &transcript,
            &AnalysisOptions::default().with_external_markers(vec!["vendor contract".to_string()]),
        )
        .await?;

    assert!(marked.metrics.content_density > plain.metrics.content_density);

    Ok(())
}

#[tokio::test]
async fn malformed_transcript_is_rejected() {
    let transcript = Transcript::new(vec![Utterance::new("time travel").at(30.0, 10.0)]);

    let err = analytics()
        .analyze(&transcript, &AnalysisOptions::default())
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Invalid transcript"));
}

#[tokio::test]
async fn result_serializes_for_formatters() -> Result<()> {
    let result = analytics()
        .analyze(&common::budget_sync(), &AnalysisOptions::default())
        .await?;

    let json = serde_json::to_value(&result)?;
    assert_eq!(json["status"]["topics"]["status"], "degraded");
    assert_eq!(json["metrics"]["duration_source"], "measured");
    assert!(json["generated_at"].is_string());

    Ok(())
}
