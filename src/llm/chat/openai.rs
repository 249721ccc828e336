use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

use super::{ChatClient, CompletionResponse};
use crate::llm::LlmConfig;
use crate::models::chat::ChatMessage;

/// Client for any provider speaking the OpenAI `chat/completions` dialect
/// (OpenAI itself, Together, Ollama's `/v1` endpoint).
pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: Option<String>,
        model: String,
        base_url: String,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| format!("Invalid API key format: {}", e))?
            );
        }

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());
        if api_key.is_none() && config.llm_type.requires_api_key() {
            return Err(format!("{} API key is required", config.llm_type).into());
        }

        Self::new(
            api_key,
            config.completion_model
                .clone()
                .unwrap_or_else(|| config.llm_type.default_model().to_string()),
            config.base_url
                .clone()
                .unwrap_or_else(|| config.llm_type.default_base_url().to_string()),
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let req = OpenAIChatRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
        };

        debug!("Sending {} messages to {}", req.messages.len(), self.completions_url());
        let resp = self.http.post(self.completions_url())
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<OpenAIResponse>()
            .await?;

        let content = resp.choices.into_iter().next()
            .ok_or_else(|| "No response from chat completion API".to_string())?
            .message.content
            .unwrap_or_default();

        Ok(CompletionResponse { response: content })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmType;

    #[test]
    fn from_config_applies_provider_defaults() {
        let config = LlmConfig {
            llm_type: LlmType::Together,
            api_key: Some("secret".into()),
            ..Default::default()
        };
        let client = OpenAIChatClient::from_config(&config).unwrap();
        assert_eq!(client.get_model(), "meta-llama/Llama-3.3-70B-Instruct-Turbo");
        assert_eq!(client.completions_url(), "https://api.together.xyz/v1/chat/completions");
    }

    #[test]
    fn from_config_requires_key_for_hosted_providers() {
        let config = LlmConfig {
            llm_type: LlmType::OpenAI,
            api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(OpenAIChatClient::from_config(&config).is_err());
    }

    #[test]
    fn ollama_runs_without_key_and_trims_base_url() {
        let config = LlmConfig {
            llm_type: LlmType::Ollama,
            base_url: Some("http://gpu-box:11434/v1/".into()),
            ..Default::default()
        };
        let client = OpenAIChatClient::from_config(&config).unwrap();
        assert_eq!(client.completions_url(), "http://gpu-box:11434/v1/chat/completions");
        assert_eq!(client.get_model(), "llama3");
    }
}
