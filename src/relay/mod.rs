pub mod client;
pub mod session;
pub mod websocket;

pub use client::{ ConversationBackend, HttpConversationBackend, RelayError };
pub use session::{ ChatSession, ConversationState, Reply };
pub use websocket::RelayServer;
