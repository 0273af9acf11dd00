//! Local Ollama backend (`/api/generate`, non-streaming)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmSettings;
use crate::oracle::client::Oracle;

const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3";

pub struct OllamaOracle {
    http: Client,
    model: String,
    endpoint: String,
}

impl OllamaOracle {
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let model = match settings.model.trim() {
            "" => DEFAULT_OLLAMA_MODEL.to_string(),
            model => model.to_string(),
        };

        let endpoint = match settings.endpoint.trim() {
            "" => DEFAULT_OLLAMA_ENDPOINT.to_string(),
            endpoint => endpoint.trim_end_matches('/').to_string(),
        };

        Ok(Self {
            http: Client::builder()
                .build()
                .context("Failed to build Ollama HTTP client")?,
            model,
            endpoint,
        })
    }

    fn request_url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }
}

#[async_trait]
impl Oracle for OllamaOracle {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn query(&self, prompt: &str, timeout: Duration) -> Result<String> {
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let payload: OllamaGenerateResponse = self
            .http
            .post(self.request_url())
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .context("Ollama request failed (is the server running?)")?
            .error_for_status()
            .context("Ollama returned an error status")?
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(payload.response)
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}
