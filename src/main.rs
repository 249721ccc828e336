use clap::Parser;
use dotenv::dotenv;
use form_agent::cli::ServiceArgs;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ServiceArgs::parse();

    form_agent::run_service(args).await
}
