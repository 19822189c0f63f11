//! Completion provider abstraction and the OpenAI-compatible HTTP client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// One non-streaming chat completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f64,
    pub max_completion_tokens: u32,
    pub top_p: f64,
    pub messages: Vec<ChatMessage>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Client for any endpoint speaking the OpenAI chat-completions dialect
/// (Groq in the stock configuration).
pub struct OpenAiCompatProvider {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl OpenAiCompatProvider {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
            api_key,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = json!({
            "model": request.model,
            "temperature": request.temperature,
            "max_completion_tokens": request.max_completion_tokens,
            "top_p": request.top_p,
            "messages": request.messages,
        });

        let mut http_request = self.client.post(&self.url).json(&body);
        if let Some(ref key) = self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let res = http_request.send().await?.error_for_status()?;
        let json: serde_json::Value = res.json().await?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .context("completion response carried no message content")?;

        Ok(content.to_string())
    }
}
