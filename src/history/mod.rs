mod memory;
use async_trait::async_trait;
use log::info;
use std::error::Error;
use crate::cli::ServiceArgs;
use std::sync::Arc;
use crate::models::chat::{ Conversation, Role };

pub use memory::MemoryConversationStore;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Creates a record holding only the system turn and returns its id.
    async fn create_conversation(
        &self,
        schema: &str,
        system_prompt: &str
    ) -> Result<String, Box<dyn Error + Send + Sync>>;

    async fn add_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn get_conversation(
        &self,
        conversation_id: &str
    ) -> Result<Option<Conversation>, Box<dyn Error + Send + Sync>>;

    async fn len(&self) -> usize;
}

pub fn create_history_store(
    args: &ServiceArgs
) -> Result<Arc<dyn ConversationStore>, Box<dyn Error + Send + Sync>> {
    match args.history_type.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryConversationStore::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.history_type)
                    )
                )
            ),
    }
}

pub fn initialize_history_store(
    args: &ServiceArgs
) -> Result<Arc<dyn ConversationStore>, Box<dyn Error + Send + Sync>> {
    info!("Conversations will be stored in: {}", args.history_type);
    create_history_store(args)
}
