use async_trait::async_trait;
use crate::models::chat::{ ChatMessage, Conversation, Role };
use crate::history::ConversationStore;
use std::collections::HashMap;
use std::error::Error;
use chrono::Utc;
use serde_json::Map;
use tokio::sync::Mutex;

/// Process-lifetime store. Records are never pruned.
#[derive(Default)]
pub struct MemoryConversationStore {
    conversations: Mutex<HashMap<String, Conversation>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn message(role: Role, content: &str) -> ChatMessage {
    ChatMessage {
        role,
        content: content.to_string(),
        timestamp: Utc::now().timestamp(),
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create_conversation(
        &self,
        schema: &str,
        system_prompt: &str
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.lock().await;
        // Size-based ids stay unique only because nothing is ever removed.
        let id = (conversations.len() + 1).to_string();
        conversations.insert(id.clone(), Conversation {
            id: id.clone(),
            schema: schema.to_string(),
            messages: vec![message(Role::System, system_prompt)],
            collected_data: Map::new(),
        });
        Ok(id)
    }

    async fn add_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| format!("Conversation {} does not exist", conversation_id))?;
        conversation.messages.push(message(role, content));
        Ok(())
    }

    async fn get_conversation(
        &self,
        conversation_id: &str
    ) -> Result<Option<Conversation>, Box<dyn Error + Send + Sync>> {
        Ok(self.conversations.lock().await.get(conversation_id).cloned())
    }

    async fn len(&self) -> usize {
        self.conversations.lock().await.len()
    }
}
