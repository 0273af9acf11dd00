mod common;

use anyhow::Result;
use tempfile::tempdir;
use tokio_test::{assert_err, assert_ok};

use minutes_analytics::{AnalysisOptions, MeetingAnalytics, Settings, TopicMethod};

#[test]
fn settings_file_drives_analysis_options() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("analytics.toml");
    std::fs::write(
        &path,
        r#"
        [analysis]
        num_topics = 2
        oracle_timeout_secs = 3

        [suggestions]
        wpm_low_water = 40.0
        "#,
    )?;

    let settings = Settings::load(&path)?;
    let options = AnalysisOptions::from_settings(&settings);
    assert_eq!(options.num_topics, 2);
    assert_eq!(options.oracle_timeout.as_secs(), 3);
    assert!(!options.use_llm);

    let analytics = MeetingAnalytics::from_settings(settings)?;
    let result = tokio_test::block_on(analytics.analyze(&common::budget_sync(), &options))?;

    assert!(result.topics.len() <= 2);
    assert_ne!(result.topic_method, TopicMethod::Skipped);
    // 48 wpm no longer counts as slow
    assert!(result
        .suggestions
        .iter()
        .all(|s| !s.text.starts_with("Tighten")));

    Ok(())
}

#[test]
fn default_config_round_trips() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("config").join("analytics.toml");

    Settings::write_default(&path)?;
    let loaded = Settings::load(&path)?;

    assert_eq!(loaded.analysis.num_topics, 5);
    assert_eq!(loaded.efficiency.weights, Settings::default().efficiency.weights);

    Ok(())
}

#[test]
fn invalid_config_is_rejected() {
    assert_err!(Settings::from_toml_str(
        r#"
        [topics]
        related_threshold = 1.5
        "#
    ));
    assert_ok!(Settings::from_toml_str("[general]\nlog_level = \"debug\"\n"));
}

#[test]
fn llm_provider_from_settings() {
    let mut settings = Settings::default();
    settings.llm.provider = "ollama".to_string();
    assert!(MeetingAnalytics::from_settings(settings).is_ok());

    let mut settings = Settings::default();
    settings.llm.provider = "telepathy".to_string();
    assert!(MeetingAnalytics::from_settings(settings).is_err());
}
