use anyhow::Result;
use clap::Parser;
use scene_layout::cli::{self, Args};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scene_layout=info")),
        )
        .init();

    cli::run(Args::parse()).await
}
