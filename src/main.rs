use clap::Parser;
use flipprobe::config::Args;
use flipprobe::lifecycle;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Starting flipprobe");

    if let Err(e) = lifecycle::run(&args).await {
        error!(error = %e, "Fatal error, exiting");
        return Err(e.into());
    }

    Ok(())
}
