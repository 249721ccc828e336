use crate::models::websocket::{ ClientMessage, ServerMessage };
use super::client::ConversationBackend;
use super::session::{ ChatSession, Reply };
use chrono::Utc;
use futures::{ Sink, SinkExt, StreamExt };
use log::{ info, warn, error };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{ AsyncRead, AsyncWrite };
use tokio::net::TcpListener;
use tokio_tungstenite::{ accept_async, tungstenite::protocol::Message, WebSocketStream };
use uuid::Uuid;

const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;

pub struct RelayServer {
    addr: String,
    backend: Arc<dyn ConversationBackend>,
}

impl RelayServer {
    pub fn new(addr: String, backend: Arc<dyn ConversationBackend>) -> Self {
        Self { addr, backend }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let listener = TcpListener::bind(&self.addr).await?;
        info!("WS relay listening on: {}", self.addr);

        loop {
            let (stream, peer) = listener.accept().await?;
            info!("Incoming connection from: {}", peer);
            let backend = Arc::clone(&self.backend);

            tokio::spawn(async move {
                match accept_async(stream).await {
                    Ok(ws) => handle_connection(peer, ws, backend).await,
                    Err(e) => error!("Handshake failed for {}: {}", peer, e),
                }
            });
        }
    }
}

fn to_server_message(reply: Reply) -> ServerMessage {
    let timestamp = Utc::now().timestamp();
    match reply {
        Reply::Text(content) => ServerMessage::Response { content, language: None, timestamp },
        Reply::Code { language, content } =>
            ServerMessage::Response { content, language: Some(language), timestamp },
        Reply::Failure(message) => ServerMessage::Error { message },
    }
}

async fn send_message<T>(tx: &mut T, msg: &ServerMessage) -> Result<(), Box<dyn Error + Send + Sync>>
    where T: Sink<Message> + Unpin, T::Error: Error + Send + Sync + 'static
{
    let json = serde_json::to_string(msg)?;
    tx.send(Message::Text(json)).await?;
    Ok(())
}

async fn send_replies<T>(tx: &mut T, replies: Vec<Reply>) -> Result<(), Box<dyn Error + Send + Sync>>
    where T: Sink<Message> + Unpin, T::Error: Error + Send + Sync + 'static
{
    for reply in replies {
        send_message(tx, &to_server_message(reply)).await?;
    }
    Ok(())
}

/// Runs one chat session for the lifetime of the WebSocket connection.
pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    backend: Arc<dyn ConversationBackend>
)
    where S: AsyncRead + AsyncWrite + Unpin
{
    let session_id = Uuid::new_v4();
    info!("New chat session {} for {}", session_id, peer);

    let (mut tx, mut rx) = websocket.split();
    let mut session = ChatSession::new(backend);

    let greeting = session.start().await;
    if let Err(e) = send_replies(&mut tx, greeting).await {
        error!("Error sending first question to {}: {}", peer, e);
        return;
    }

    while let Some(msg) = rx.next().await {
        let message = match msg {
            Ok(message) => message,
            Err(e) => {
                info!("WebSocket connection closed or errored for {}: {}", peer, e);
                break;
            }
        };

        if message.len() > MAX_MESSAGE_SIZE {
            warn!(
                "Message from {} exceeds size limit ({} > {})",
                peer,
                message.len(),
                MAX_MESSAGE_SIZE
            );
            let error_msg = ServerMessage::Error {
                message: "Message too large".to_string(),
            };
            if let Err(e) = send_message(&mut tx, &error_msg).await {
                error!("Failed to send size limit error to {}: {}", peer, e);
            }
            break;
        }

        match message {
            Message::Text(text) => {
                let result = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Chat { content }) => {
                        // Completed sessions answer locally, so only announce real work.
                        if !session.state().completed && session.state().conversation_id.is_some() {
                            if let Err(e) = send_message(&mut tx, &ServerMessage::Processing).await {
                                error!("Error sending processing status to {}: {}", peer, e);
                                break;
                            }
                        }
                        let replies = session.handle_message(&content).await;
                        send_replies(&mut tx, replies).await
                    }
                    Err(e) => {
                        error!("Failed to parse message from {}: {}", peer, e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Failed to parse message: {}", e),
                        };
                        send_message(&mut tx, &error_msg).await
                    }
                };
                if let Err(e) = result {
                    error!("Error sending message to {}: {}", peer, e);
                    break;
                }
            }
            Message::Close(_) => {
                info!("Received close frame from {}", peer);
                break;
            }
            Message::Ping(ping_data) => {
                if tx.send(Message::Pong(ping_data)).await.is_err() {
                    error!("Failed to send pong to {}", peer);
                    break;
                }
            }
            Message::Pong(_) => {}
            Message::Binary(_) => {
                warn!("Ignoring binary message from {}", peer);
            }
            Message::Frame(_) => {}
        }
    }
    info!("Chat session {} closed for {}", session_id, peer);
}
