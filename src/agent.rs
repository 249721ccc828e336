use crate::cli::ServiceArgs;
use crate::config::prompt::{ build_system_prompt, load_schema };
use crate::history::{ initialize_history_store, ConversationStore };
use crate::llm::{ LlmConfig, LlmType };
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::models::api::{ StartConversationResponse, SubmitAnswerResponse };
use crate::models::chat::Role;

use log::{ info, warn, debug };
use serde_json::Value as JsonValue;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("LLM provider error: {0}")]
    Provider(Box<dyn StdError + Send + Sync>),

    #[error("Conversation store error: {0}")]
    Store(Box<dyn StdError + Send + Sync>),
}

/// Returns the parsed document when `reply` is the finished form.
///
/// The check is deliberately literal: the first character must be `{` and
/// the last `}`, with no whitespace trimming or code-fence stripping. A
/// brace-delimited reply that fails to parse is treated as a question.
pub fn detect_completion(reply: &str) -> Option<JsonValue> {
    if !(reply.starts_with('{') && reply.ends_with('}')) {
        return None;
    }
    match serde_json::from_str::<JsonValue>(reply) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Brace-delimited reply is not valid JSON ({}), treating as question", e);
            None
        }
    }
}

#[derive(Clone)]
pub struct FormAgent {
    chat_client: Arc<dyn ChatClient>,
    store: Arc<dyn ConversationStore>,
    schema: String,
}

impl FormAgent {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        store: Arc<dyn ConversationStore>,
        schema: String
    ) -> Self {
        Self { chat_client, store, schema }
    }

    pub fn from_args(args: &ServiceArgs) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_llm_type: LlmType = args.chat_llm_type.parse()?;
        let chat_config = LlmConfig {
            llm_type: chat_llm_type,
            base_url: args.chat_base_url.clone(),
            api_key: args.resolved_api_key(),
            completion_model: args.chat_model.clone(),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={}",
            chat_llm_type,
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("provider default")
        );

        let store = initialize_history_store(args)?;
        let schema = load_schema(args.schema_path.as_deref())?;

        Ok(Self::new(chat_client, store, schema))
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    async fn ask_llm(&self, conversation_id: &str) -> Result<String, AgentError> {
        let conversation = self.store
            .get_conversation(conversation_id).await
            .map_err(AgentError::Store)?
            .ok_or_else(|| AgentError::NotFound(conversation_id.to_string()))?;

        let reply = self.chat_client
            .complete(&conversation.messages).await
            .map_err(AgentError::Provider)?;
        Ok(reply.response)
    }

    pub async fn start_conversation(&self) -> Result<StartConversationResponse, AgentError> {
        let system_prompt = build_system_prompt(&self.schema);
        let conversation_id = self.store
            .create_conversation(&self.schema, &system_prompt).await
            .map_err(AgentError::Store)?;
        info!(
            "Started conversation {} ({} conversations in store)",
            conversation_id,
            self.store.len().await
        );

        let question = self.ask_llm(&conversation_id).await?;
        self.store
            .add_message(&conversation_id, Role::Assistant, &question).await
            .map_err(AgentError::Store)?;

        Ok(StartConversationResponse { conversation_id, question })
    }

    pub async fn submit_answer(
        &self,
        conversation_id: &str,
        answer: &str
    ) -> Result<SubmitAnswerResponse, AgentError> {
        if self.store.get_conversation(conversation_id).await.map_err(AgentError::Store)?.is_none() {
            warn!("Answer submitted for unknown conversation {}", conversation_id);
            return Err(AgentError::NotFound(conversation_id.to_string()));
        }

        self.store
            .add_message(conversation_id, Role::User, answer).await
            .map_err(AgentError::Store)?;
        let reply = self.ask_llm(conversation_id).await?;

        if let Some(json) = detect_completion(&reply) {
            info!("Conversation {} completed", conversation_id);
            return Ok(SubmitAnswerResponse::Complete { json });
        }

        self.store
            .add_message(conversation_id, Role::Assistant, &reply).await
            .map_err(AgentError::Store)?;
        debug!("Conversation {} awaiting next answer", conversation_id);

        Ok(SubmitAnswerResponse::InProgress { question: reply })
    }
}
