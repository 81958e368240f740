//! Credentialed generative metadata source.
//!
//! The service is asked for JSON constrained by a response schema; callers parse
//! the returned text into their own types.

use anyhow::{Context, Result, anyhow};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use crate::constants::constants;

/// Something that turns a prompt plus an output schema into JSON text.
pub trait StructuredGenerator: Send + Sync {
  fn generate<'a>(&'a self, prompt: &'a str, schema: &'a Value) -> BoxFuture<'a, Result<String>>;
}

/// Gemini `generateContent` over REST.
pub struct GeminiClient {
  http: Client,
  api_key: String,
  model: String,
  endpoint: String,
}

impl GeminiClient {
  pub fn new(http: Client, api_key: String, model: String) -> Self {
    Self { http, api_key, model, endpoint: constants().ai_endpoint.clone() }
  }

  fn request_url(&self) -> String {
    format!("{}/{}:generateContent", self.endpoint.trim_end_matches('/'), self.model)
  }

  async fn call(&self, prompt: &str, schema: &Value) -> Result<String> {
    let body = json!({
      "contents": [{ "parts": [{ "text": prompt }] }],
      "generationConfig": {
        "responseMimeType": "application/json",
        "responseSchema": schema,
      },
    });

    debug!(model = %self.model, "ai: generateContent request");
    let response = self
      .http
      .post(self.request_url())
      .header("x-goog-api-key", &self.api_key)
      .timeout(Duration::from_secs(constants().request_timeout_secs))
      .json(&body)
      .send()
      .await
      .context("AI request failed")?;

    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      return Err(anyhow!("AI service returned {}: {}", status, text.chars().take(200).collect::<String>()));
    }

    let parsed: GenerateResponse = response.json().await.context("AI response was not valid JSON")?;
    parsed.first_text().ok_or_else(|| anyhow!("AI response contained no text"))
  }
}

impl StructuredGenerator for GeminiClient {
  fn generate<'a>(&'a self, prompt: &'a str, schema: &'a Value) -> BoxFuture<'a, Result<String>> {
    Box::pin(self.call(prompt, schema))
  }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
  text: Option<String>,
}

impl GenerateResponse {
  fn first_text(&self) -> Option<String> {
    let content = self.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
    if text.trim().is_empty() { None } else { Some(text) }
  }
}

/// Parse generated JSON text, tolerating a surrounding Markdown code fence.
pub fn parse_generated<T: DeserializeOwned>(text: &str) -> Result<T> {
  let trimmed = text.trim();
  let body = trimmed
    .strip_prefix("```json")
    .or_else(|| trimmed.strip_prefix("```"))
    .and_then(|s| s.strip_suffix("```"))
    .unwrap_or(trimmed);
  serde_json::from_str(body.trim()).context("AI output did not match the expected schema")
}

/// Build an object schema whose listed properties are all required strings.
pub fn string_object_schema(fields: &[&str]) -> Value {
  let properties: serde_json::Map<String, Value> =
    fields.iter().map(|f| (f.to_string(), json!({ "type": "STRING" }))).collect();
  json!({
    "type": "OBJECT",
    "properties": properties,
    "required": fields,
  })
}
