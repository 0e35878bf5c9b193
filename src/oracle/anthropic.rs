//! Anthropic Messages API oracle

use super::{parse_company_records, CompanyRecord, ExtractionOracle, OracleError};
use crate::config::OracleConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Longest slice of an error body kept in `OracleError::Http`
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Oracle backed by a Claude model
#[derive(Debug, Clone)]
pub struct AnthropicOracle {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl AnthropicOracle {
    /// Creates an oracle with an explicit API key
    pub fn new(config: &OracleConfig, api_key: impl Into<String>) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            system_prompt: config.effective_system_prompt().to_string(),
        })
    }

    /// Creates an oracle reading the API key from the configured variable
    ///
    /// # Returns
    ///
    /// * `Ok(AnthropicOracle)` - Key found and client built
    /// * `Err(OracleError::MissingApiKey)` - Variable unset or blank
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| OracleError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(config, api_key)
    }

    /// Model identifier sent with every call
    pub fn model(&self) -> &str {
        &self.model
    }

    fn user_prompt(text: &str) -> String {
        format!(
            "Extract all company names and addresses from this text:\n\n{}\n\n\
             Remember to return only valid JSON in the specified format.",
            text
        )
    }
}

#[async_trait]
impl ExtractionOracle for AnthropicOracle {
    async fn extract(
        &self,
        text: &str,
        source_url: &str,
    ) -> Result<Vec<CompanyRecord>, OracleError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 0.0,
            system: &self.system_prompt,
            messages: vec![Message {
                role: "user",
                content: Self::user_prompt(text),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Http {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        let answer: String = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if answer.trim().is_empty() {
            return Err(OracleError::Malformed(
                "response contained no text content".to_string(),
            ));
        }

        let records = parse_company_records(&answer, source_url)?;
        tracing::info!("Extracted {} companies from {}", records.len(), source_url);
        Ok(records)
    }
}
