pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "luxehaven")]
#[command(about = "LuxeHaven - real-estate listing API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides LUXEHAVEN_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Create an ADMIN account if the email is not registered")]
    CreateAdmin {
        #[arg(long, help = "Admin email address")]
        email: String,
        #[arg(long, help = "Admin password (at least 8 characters)")]
        password: String,
        #[arg(long, default_value = "Administrator", help = "Display name")]
        name: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Migrate => commands::migrate::handle().await,
        Commands::CreateAdmin { email, password, name } => commands::admin::handle(&email, &password, &name).await,
    }
}
