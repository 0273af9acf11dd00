//! Google Gemini backend (`models/{model}:generateContent`)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{LlmSettings, API_KEY_ENV};
use crate::oracle::client::Oracle;

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Low temperature keeps topic and suggestion replies close to the requested JSON shape
const GENERATION_TEMPERATURE: f32 = 0.2;

pub struct GeminiOracle {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiOracle {
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let api_key = match settings.api_key.trim() {
            "" => anyhow::bail!(
                "Gemini API key is missing. Set llm.api_key in config or {}.",
                API_KEY_ENV
            ),
            key => key.to_string(),
        };

        let model = match settings.model.trim() {
            "" => DEFAULT_GEMINI_MODEL.to_string(),
            model => model.to_string(),
        };

        let endpoint = match settings.endpoint.trim() {
            "" => DEFAULT_GEMINI_ENDPOINT.to_string(),
            endpoint => endpoint.trim_end_matches('/').to_string(),
        };

        let http = Client::builder()
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model,
            endpoint,
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }
}

#[async_trait]
impl Oracle for GeminiOracle {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn query(&self, prompt: &str, timeout: Duration) -> Result<String> {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: GENERATION_TEMPERATURE,
            },
        };

        let reply: GenerateReply = self
            .http
            .post(self.request_url())
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .context("Gemini request failed")?
            .error_for_status()
            .context("Gemini returned an error status")?
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        reply
            .first_text()
            .context("Gemini response did not contain any text")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<ReplyCandidate>,
}

#[derive(Debug, Deserialize)]
struct ReplyCandidate {
    #[serde(default)]
    content: Option<ReplyContent>,
}

#[derive(Debug, Deserialize)]
struct ReplyContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateReply {
    /// First non-blank text part across all candidates.
    /// Candidates blocked by safety filters arrive without content and are skipped.
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| &content.parts)
            .filter_map(|part| part.text.as_deref())
            .map(str::trim)
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_and_model_fall_back_to_defaults() {
        let settings = LlmSettings {
            provider: "gemini".to_string(),
            api_key: " secret ".to_string(),
            ..LlmSettings::default()
        };
        let oracle = GeminiOracle::from_settings(&settings).unwrap();
        assert_eq!(
            oracle.request_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent?key=secret"
        );
    }

    #[test]
    fn custom_endpoint_loses_trailing_slash() {
        let settings = LlmSettings {
            provider: "gemini".to_string(),
            api_key: "k".to_string(),
            model: "gemini-pro".to_string(),
            endpoint: "http://proxy.local/v1/".to_string(),
            ..LlmSettings::default()
        };
        let oracle = GeminiOracle::from_settings(&settings).unwrap();
        assert_eq!(
            oracle.request_url(),
            "http://proxy.local/v1/models/gemini-pro:generateContent?key=k"
        );
    }

    #[test]
    fn request_uses_camel_case_generation_config() {
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: "hi" }],
            }],
            generation_config: GenerationConfig { temperature: 0.5 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn first_text_skips_blocked_and_blank_candidates() {
        let reply: GenerateReply = serde_json::from_str(
            r#"{"candidates":[
                {"finishReason":"SAFETY"},
                {"content":{"parts":[{"text":"  "}]}},
                {"content":{"parts":[{"text":" hello "}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(reply.first_text().as_deref(), Some("hello"));
        assert_eq!(GenerateReply::default().first_text(), None);
    }
}
