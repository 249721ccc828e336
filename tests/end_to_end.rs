use async_trait::async_trait;
use form_agent::agent::FormAgent;
use form_agent::config::prompt::DEFAULT_SCHEMA;
use form_agent::history::{ ConversationStore, MemoryConversationStore };
use form_agent::llm::chat::{ ChatClient, CompletionResponse };
use form_agent::models::chat::ChatMessage;
use form_agent::relay::{
    ChatSession,
    ConversationBackend,
    HttpConversationBackend,
    RelayError,
    Reply,
};
use form_agent::server::api::router;
use std::collections::VecDeque;
use std::error::Error;
use std::sync::{ Arc, Mutex };

struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<usize>,
}

impl ScriptedLlm {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ChatClient for ScriptedLlm {
    async fn complete(
        &self,
        _messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn Error + Send + Sync>> {
        *self.calls.lock().unwrap() += 1;
        let next = self.replies.lock().unwrap().pop_front();
        next.map(|response| CompletionResponse { response }).ok_or_else(|| "script exhausted".into())
    }

    fn get_model(&self) -> String {
        "scripted".into()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

async fn spawn_service(llm: Arc<ScriptedLlm>, store: Arc<MemoryConversationStore>) -> String {
    let agent = Arc::new(FormAgent::new(llm, store, DEFAULT_SCHEMA.to_string()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(agent).into_make_service()).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn relay_walks_through_form_until_completion() {
    let llm = Arc::new(
        ScriptedLlm::new(
            &[
                "What is your first name?",
                "What is your last name?",
                "What is your email address?",
                "How old are you?",
                r#"{"firstName":"Jane","lastName":"Doe","email":"jane@doe.com","age":"30"}"#,
            ]
        )
    );
    let store = Arc::new(MemoryConversationStore::new());
    let base_url = spawn_service(llm.clone(), store.clone()).await;
    let mut session = ChatSession::new(Arc::new(HttpConversationBackend::new(base_url)));

    assert_eq!(session.start().await, vec![Reply::Text("What is your first name?".into())]);
    assert_eq!(
        session.handle_message("Jane").await,
        vec![Reply::Text("What is your last name?".into())]
    );
    assert_eq!(
        session.handle_message("Doe").await,
        vec![Reply::Text("What is your email address?".into())]
    );
    assert_eq!(session.handle_message("jane@doe.com").await, vec![Reply::Text("How old are you?".into())]);

    let replies = session.handle_message("30").await;
    assert_eq!(replies.len(), 2);
    assert_eq!(
        replies[0],
        Reply::Text(
            "Form completed!\n\nHere are your details:\n\
             firstName: Jane\nlastName: Doe\nemail: jane@doe.com\nage: 30"
                .into()
        )
    );
    assert!(matches!(&replies[1], Reply::Code { language, content }
        if language == "json" && content.contains("\"email\": \"jane@doe.com\"")));

    // System, first question, three answered questions, then the final answer alone.
    let id = session.state().conversation_id.clone().unwrap();
    let conversation = store.get_conversation(&id).await.unwrap().unwrap();
    assert_eq!(conversation.messages.len(), 1 + 1 + 2 * 3 + 1);

    assert_eq!(llm.calls(), 5);
    assert_eq!(
        session.handle_message("hello?").await,
        vec![Reply::Text("The form is already completed. Start a new chat to begin again.".into())]
    );
    assert_eq!(llm.calls(), 5);
}

#[tokio::test]
async fn relay_reports_generic_failure_for_unreachable_service() {
    // Nothing listens on the discard port.
    let mut session = ChatSession::new(Arc::new(HttpConversationBackend::new("http://127.0.0.1:9")));

    assert_eq!(session.start().await, vec![Reply::Failure("Failed to start conversation".into())]);
    assert!(session.state().conversation_id.is_none());
}

#[tokio::test]
async fn unknown_conversation_is_404_without_touching_store() {
    let llm = Arc::new(ScriptedLlm::new(&[]));
    let store = Arc::new(MemoryConversationStore::new());
    let base_url = spawn_service(llm.clone(), store.clone()).await;

    let backend = HttpConversationBackend::new(base_url);
    let err = backend.submit_answer("42", "Jane").await.unwrap_err();
    assert!(matches!(err, RelayError::Status(status) if status.as_u16() == 404));
    assert_eq!(store.len().await, 0);
    assert_eq!(llm.calls(), 0);
}
