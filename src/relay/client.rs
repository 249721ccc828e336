use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, StatusCode };
use thiserror::Error;

use crate::models::api::{ StartConversationResponse, SubmitAnswerRequest, SubmitAnswerResponse };

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Request to conversation service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Conversation service returned {0}")]
    Status(StatusCode),

    #[error("Undecodable conversation service response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// The two calls a chat session makes against the conversation service.
#[async_trait]
pub trait ConversationBackend: Send + Sync {
    async fn start_conversation(&self) -> Result<StartConversationResponse, RelayError>;

    async fn submit_answer(
        &self,
        conversation_id: &str,
        answer: &str
    ) -> Result<SubmitAnswerResponse, RelayError>;
}

#[derive(Clone)]
pub struct HttpConversationBackend {
    http: HttpClient,
    base_url: String,
}

impl HttpConversationBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }
}

#[async_trait]
impl ConversationBackend for HttpConversationBackend {
    async fn start_conversation(&self) -> Result<StartConversationResponse, RelayError> {
        let resp = self.http.get(self.url("/start_conversation")).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(RelayError::Status(resp.status()));
        }
        resp.json::<StartConversationResponse>().await.map_err(RelayError::Decode)
    }

    async fn submit_answer(
        &self,
        conversation_id: &str,
        answer: &str
    ) -> Result<SubmitAnswerResponse, RelayError> {
        let req = SubmitAnswerRequest {
            conversation_id: conversation_id.to_string(),
            answer: answer.to_string(),
        };
        debug!("Submitting answer for conversation {}", conversation_id);
        let resp = self.http.post(self.url("/submit_answer")).json(&req).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(RelayError::Status(resp.status()));
        }
        resp.json::<SubmitAnswerResponse>().await.map_err(RelayError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{ routing::{ get, post }, Json, Router };
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn garbled_success_body_is_a_decode_error() {
        let app = Router::new()
            .route("/start_conversation", get(|| async { "definitely not json" }))
            .route("/submit_answer", post(|| async { Json(json!({ "status": "unknown" })) }));
        let backend = HttpConversationBackend::new(serve(app).await);

        assert!(matches!(backend.start_conversation().await, Err(RelayError::Decode(_))));
        assert!(matches!(backend.submit_answer("1", "Jane").await, Err(RelayError::Decode(_))));
    }

    #[tokio::test]
    async fn non_ok_status_is_reported_before_decoding() {
        let app = Router::new().route(
            "/start_conversation",
            get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "busy") })
        );
        let backend = HttpConversationBackend::new(serve(app).await);

        let err = backend.start_conversation().await.unwrap_err();
        assert!(matches!(err, RelayError::Status(status) if status.as_u16() == 503));
    }
}
