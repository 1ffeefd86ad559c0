use clap::Parser;
use tracing_subscriber::EnvFilter;

use luxehaven::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("luxehaven=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = luxehaven::cli::run(cli).await {
        tracing::error!("{e:#}");
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }

    Ok(())
}
