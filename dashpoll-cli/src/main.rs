//! Dashpoll CLI
//!
//! Command-line interface for polling dashboard JSON endpoints.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dashpoll")]
#[command(about = "Poll dashboard JSON endpoints", long_about = None)]
struct Cli {
    /// Dashboard server URL
    #[arg(
        long,
        env = "DASHPOLL_SERVER_URL",
        default_value = "http://localhost:8153"
    )]
    server_url: String,

    /// Context root the application is served under
    #[arg(long, env = "DASHPOLL_CONTEXT_ROOT", default_value = "/go")]
    context_root: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so payloads on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashpoll=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
        context_root: cli.context_root,
    };

    handle_command(cli.command, &config).await
}
