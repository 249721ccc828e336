use crate::agent::{ AgentError, FormAgent };
use crate::models::api::{
    ErrorResponse,
    StartConversationResponse,
    SubmitAnswerRequest,
    SubmitAnswerResponse,
};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Clone)]
struct AppState {
    agent: Arc<FormAgent>,
}

pub struct ApiError(AgentError);

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, detail) = match &self.0 {
            AgentError::NotFound(_) => (StatusCode::NOT_FOUND, "Conversation not found".to_string()),
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };
        (code, Json(ErrorResponse { detail })).into_response()
    }
}

pub fn router(agent: Arc<FormAgent>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/start_conversation", get(start_conversation_handler))
        .route("/submit_answer", post(submit_answer_handler))
        .layer(cors)
        .with_state(AppState { agent })
}

pub async fn start_http_server(
    addr: &str,
    agent: Arc<FormAgent>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
    })?;
    info!("Conversation service listening on: http://{}", listener.local_addr()?);

    axum::serve(listener, router(agent).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Conversation service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn start_conversation_handler(
    State(state): State<AppState>,
) -> Result<Json<StartConversationResponse>, ApiError> {
    Ok(Json(state.agent.start_conversation().await?))
}

async fn submit_answer_handler(
    State(state): State<AppState>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    info!("Answer received for conversation {}", req.conversation_id);
    Ok(Json(state.agent.submit_answer(&req.conversation_id, &req.answer).await?))
}
