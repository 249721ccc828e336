use clap::Parser;
use dotenv::dotenv;
use form_agent::cli::RelayArgs;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = RelayArgs::parse();

    form_agent::run_relay(args).await
}
