//! Gemini API client implementation
//!
//! This module implements the LlmClient trait for Google's generateContent API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::LlmConfig;
use crate::error::{Result, ShopmateError};
use crate::llm::client::LlmClient;
use crate::llm::tool_parser::parse_response;
use crate::llm::types::{ChatTurn, CompletionRequest, CompletionResponse, Role};

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_output_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl GeminiClient {
    /// Create a client from config and an already-resolved API key
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ShopmateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for the generateContent API
    fn build_request(&self, request: &CompletionRequest) -> Value {
        let contents: Vec<Value> = request
            .contents
            .iter()
            .filter(|turn| !turn.parts.is_empty())
            .map(content_json)
            .collect();

        let mut body = json!({ "contents": contents });

        if !request.system_instruction.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{ "text": request.system_instruction }]
            });
        }

        if !request.tools.is_empty() {
            let declarations: Vec<Value> = request.tools.iter().map(|t| t.to_gemini_schema()).collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        let mut generation = serde_json::Map::new();
        if let Some(max) = self.max_output_tokens {
            generation.insert("maxOutputTokens".to_string(), json!(max));
        }
        if let Some(t) = self.temperature {
            generation.insert("temperature".to_string(), json!(t));
        }
        if !generation.is_empty() {
            body["generationConfig"] = Value::Object(generation);
        }

        body
    }

    /// Send a request to the Gemini API
    async fn send_request(&self, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ShopmateError::Upstream(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ShopmateError::Upstream(format!("Gemini API error {}: {}", status, error_body)));
        }

        response
            .json()
            .await
            .map_err(|e| ShopmateError::Upstream(format!("Failed to parse Gemini response: {}", e)))
    }
}

/// Gemini accepts only `user` and `model`; function responses travel as user content.
fn content_json(turn: &ChatTurn) -> Value {
    let role = match turn.role {
        Role::User | Role::Tool => "user",
        Role::Model => "model",
    };
    json!({ "role": role, "parts": turn.parts })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(request);
        log::debug!(
            "Calling {} with {} turns, {} tools",
            self.model,
            request.contents.len(),
            request.tools.len()
        );
        let response = self.send_request(body).await?;
        parse_response(&response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
