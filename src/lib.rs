pub mod agent;
pub mod models;
pub mod server;
pub mod relay;
pub mod config;
pub mod llm;
pub mod cli;
pub mod history;

use agent::FormAgent;
use cli::{ RelayArgs, ServiceArgs };
use log::info;
use relay::{ HttpConversationBackend, RelayServer };
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run_service(args: ServiceArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Conversation Service Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("provider default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("provider default"));
    info!("History Store Type: {}", args.history_type);
    info!("Schema Path: {}", args.schema_path.as_deref().unwrap_or("built-in"));
    info!("------------------------------------------");

    let agent = Arc::new(FormAgent::from_args(&args)?);
    let server = Server::new(args.server_addr.clone(), agent);
    server.run().await?;

    Ok(())
}

pub async fn run_relay(args: RelayArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Chat Relay Configuration ---");
    info!("Relay Address: {}", args.relay_addr);
    info!("Conversation Service: {}", args.api_base_url);
    info!("--------------------------------");

    let backend = Arc::new(HttpConversationBackend::new(args.api_base_url.clone()));
    let server = RelayServer::new(args.relay_addr.clone(), backend);
    server.run().await?;

    Ok(())
}
