use log::{ info, warn };
use serde_json::{ Map, Value };
use std::sync::Arc;

use super::client::ConversationBackend;
use crate::models::api::SubmitAnswerResponse;

pub const START_FAILED: &str = "Failed to start conversation";
pub const ANSWER_FAILED: &str = "Error processing your answer";
pub const ALREADY_COMPLETED: &str =
    "The form is already completed. Start a new chat to begin again.";

/// One message shown to the chat user.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Code {
        language: String,
        content: String,
    },
    Failure(String),
}

#[derive(Debug, Default, Clone)]
pub struct ConversationState {
    pub conversation_id: Option<String>,
    pub current_question: Option<String>,
    pub completed: bool,
    pub final_json: Option<Map<String, Value>>,
}

/// Client side of one chat: remembers which conversation it drives and
/// refuses to keep talking once the form is done.
pub struct ChatSession {
    backend: Arc<dyn ConversationBackend>,
    state: ConversationState,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ConversationBackend>) -> Self {
        Self { backend, state: ConversationState::default() }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub async fn start(&mut self) -> Vec<Reply> {
        match self.backend.start_conversation().await {
            Ok(started) => {
                info!("Chat session bound to conversation {}", started.conversation_id);
                self.state.conversation_id = Some(started.conversation_id);
                self.state.current_question = Some(started.question.clone());
                vec![Reply::Text(started.question)]
            }
            Err(e) => {
                warn!("Could not start conversation: {}", e);
                vec![Reply::Failure(START_FAILED.to_string())]
            }
        }
    }

    pub async fn handle_message(&mut self, content: &str) -> Vec<Reply> {
        if self.state.completed {
            return vec![Reply::Text(ALREADY_COMPLETED.to_string())];
        }
        let Some(conversation_id) = self.state.conversation_id.clone() else {
            return vec![Reply::Failure(START_FAILED.to_string())];
        };

        match self.backend.submit_answer(&conversation_id, content).await {
            Ok(SubmitAnswerResponse::Complete { json }) => {
                let fields = match json {
                    Value::Object(map) => map,
                    other => {
                        let mut map = Map::new();
                        map.insert("value".to_string(), other);
                        map
                    }
                };
                let replies = vec![
                    Reply::Text(format!(
                        "Form completed!\n\nHere are your details:\n{}",
                        flatten_fields(&fields)
                    )),
                    Reply::Code {
                        language: "json".to_string(),
                        content: format!("```json\n{}\n```", raw_json(&fields)),
                    },
                ];
                self.state.completed = true;
                self.state.final_json = Some(fields);
                replies
            }
            Ok(SubmitAnswerResponse::InProgress { question }) => {
                self.state.current_question = Some(question.clone());
                vec![Reply::Text(question)]
            }
            Err(e) => {
                warn!("Answer for conversation {} failed: {}", conversation_id, e);
                vec![Reply::Failure(ANSWER_FAILED.to_string())]
            }
        }
    }
}

/// `key: value` per top-level field; strings are shown without quotes.
pub fn flatten_fields(fields: &Map<String, Value>) -> String {
    fields
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!("{}: {}", k, s),
            other => format!("{}: {}", k, other),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn raw_json(fields: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(fields).unwrap_or_else(|_| Value::Object(fields.clone()).to_string())
}
