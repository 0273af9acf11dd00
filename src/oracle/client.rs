use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmSettings;
use crate::oracle::gemini::GeminiOracle;
use crate::oracle::ollama::OllamaOracle;
use crate::AnalyticsError;

/// Narrow LLM access: one prompt in, one completion out.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw completion text.
    /// Implementations should give up after `timeout`.
    async fn query(&self, prompt: &str, timeout: Duration) -> Result<String>;
}

/// Build an oracle from runtime settings; `none` means no oracle at all.
pub fn build_oracle(settings: &LlmSettings) -> Result<Option<Arc<dyn Oracle>>> {
    match settings.provider.trim().to_lowercase().as_str() {
        "" | "none" => Ok(None),
        "gemini" => Ok(Some(Arc::new(GeminiOracle::from_settings(settings)?))),
        "ollama" => Ok(Some(Arc::new(OllamaOracle::from_settings(settings)?))),
        other => anyhow::bail!(
            "Unsupported llm.provider '{}'. Supported providers: none, gemini, ollama",
            other
        ),
    }
}

/// Query the oracle under a hard timeout.
///
/// A timeout, a transport error, and an empty completion all come back as
/// errors; callers treat every one of them as "oracle unavailable".
pub async fn ask(oracle: &dyn Oracle, prompt: &str, timeout: Duration) -> crate::Result<String> {
    tracing::debug!("Querying oracle '{}' ({} prompt chars)", oracle.name(), prompt.len());

    match tokio::time::timeout(timeout, oracle.query(prompt, timeout)).await {
        Err(_) => Err(AnalyticsError::OracleTimeout(timeout)),
        Ok(Err(e)) => Err(AnalyticsError::Oracle(format!("{}: {:#}", oracle.name(), e))),
        Ok(Ok(text)) if text.trim().is_empty() => Err(AnalyticsError::Oracle(format!(
            "{} returned an empty completion",
            oracle.name()
        ))),
        Ok(Ok(text)) => Ok(text),
    }
}
