use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "JSON form filling conversation service", long_about = None)]
pub struct ServiceArgs {
    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (together, openai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "together")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., https://api.together.xyz/v1)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let the provider preset decide
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Legacy name for the chat API key, read when CHAT_API_KEY is empty.
    #[arg(long, env = "AIT_API_KEY", default_value = "", hide_env_values = true, hide = true)]
    pub ait_api_key: String,

    /// Model name for chat completion (e.g., meta-llama/Llama-3.3-70B-Instruct-Turbo, gpt-4o)
    #[arg(long, env = "CHAT_MODEL")]
    pub chat_model: Option<String>,

    // --- Conversation Store Args ---
    /// Conversation store type (memory)
    #[arg(long, env = "HISTORY_TYPE", default_value = "memory")]
    pub history_type: String,

    // --- General App Args ---
    /// Path to the JSON Schema describing the form. Uses the built-in Personal Details schema when unset.
    #[arg(long, env = "SCHEMA_PATH")]
    pub schema_path: Option<String>,

    /// Host address and port for the HTTP API to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8000")]
    pub server_addr: String,
}

impl ServiceArgs {
    pub fn resolved_api_key(&self) -> Option<String> {
        [&self.chat_api_key, &self.ait_api_key]
            .into_iter()
            .find(|k| !k.trim().is_empty())
            .cloned()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "WebSocket chat relay for the form filling service", long_about = None)]
pub struct RelayArgs {
    /// Host address and port for the WebSocket relay to listen on.
    #[arg(long, env = "RELAY_ADDR", default_value = "127.0.0.1:4000")]
    pub relay_addr: String,

    /// Base URL of the conversation service.
    #[arg(long, env = "API_BASE_URL", default_value = "http://localhost:8000")]
    pub api_base_url: String,
}
