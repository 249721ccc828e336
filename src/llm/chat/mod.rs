pub mod openai;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::sync::Arc;
use super::LlmConfig;
use self::openai::OpenAIChatClient;
use crate::models::chat::ChatMessage;

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the whole turn sequence and returns the provider's single text reply.
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
