//! Fetch command
//!
//! Fetches a document once, without starting an executor.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use dashpoll_client::DashboardClient;
use dashpoll_core::{ContextRoot, resolve_url};

use super::render_json;
use crate::config::Config;

/// Arguments for `dashpoll fetch`
#[derive(Args)]
pub struct FetchArgs {
    /// Logical path of the document (e.g. agents.json)
    path: String,
}

/// Fetch and print a document
pub async fn handle_fetch(args: FetchArgs, config: &Config) -> Result<()> {
    let client = DashboardClient::new(&config.server_url);
    let resolver = ContextRoot::new(&config.context_root);
    let url = resolve_url(&resolver, &args.path);

    match client.get_json(&url).await {
        Ok(payload) => {
            println!("{}", render_json(payload.as_value()));
            Ok(())
        }
        Err(e) if e.is_unauthorized() => {
            println!(
                "{} Log in at {}",
                "Session rejected.".red().bold(),
                client.login_url(&resolver).underline()
            );
            Err(e).context("Server requires authentication")
        }
        Err(e) => Err(e).with_context(|| format!("Failed to fetch {}", url)),
    }
}
