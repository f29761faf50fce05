use anyhow::Result;
use clap::Parser;
use photo_relay::cli::{run, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Tokens may come from a local .env file.
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "photo-relay starting");

    if let Err(e) = run(cli).await {
        tracing::error!(error = ?e, "photo-relay aborted");
        return Err(e);
    }
    tracing::info!("photo-relay finished");
    Ok(())
}
