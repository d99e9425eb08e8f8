//! Watch command
//!
//! Runs a polling executor against one document and prints every payload
//! it delivers. Single-letter commands on stdin drive the executor while
//! it runs.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use dashpoll_client::DashboardClient;
use dashpoll_core::{ContextRoot, Payload};
use dashpoll_executor::{DeliveryPolicy, ExecutorConfig, Observer, PollingExecutor};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use super::{colorize_state, render_json};
use crate::config::Config;

/// Arguments for `dashpoll watch`
#[derive(Args)]
pub struct WatchArgs {
    /// Logical path of the document (e.g. agents.json)
    path: String,

    /// Milliseconds between the end of one poll and the next
    #[arg(long, env = "DASHPOLL_INTERVAL_MS", default_value_t = 5000)]
    interval_ms: u64,

    /// Stop polling once a top-level member equals a value (KEY=VALUE)
    #[arg(long, value_parser = parse_pause_when)]
    pause_when: Option<PauseWhen>,

    /// Ignore responses superseded by a forced refresh
    #[arg(long)]
    drop_expired: bool,

    /// Cancel the in-flight request on a forced refresh
    #[arg(long)]
    abort_superseded: bool,

    /// Skip only the affected observer instead of ending the delivery cycle
    #[arg(long)]
    skip_observer: bool,
}

/// `KEY=VALUE` pause condition
///
/// VALUE is parsed as JSON when possible, so `done=true` matches the
/// boolean and `state=Completed` matches the string.
#[derive(Debug, Clone, PartialEq)]
pub struct PauseWhen {
    key: String,
    value: JsonValue,
}

impl PauseWhen {
    fn matches(&self, payload: &Payload) -> bool {
        payload.get(&self.key) == Some(&self.value)
    }
}

fn parse_pause_when(raw: &str) -> Result<PauseWhen, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;

    let key = key.trim();
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }

    let value = serde_json::from_str(value.trim())
        .unwrap_or_else(|_| JsonValue::String(value.trim().to_string()));

    Ok(PauseWhen {
        key: key.to_string(),
        value,
    })
}

/// Observer that prints payloads to stdout
struct PrintObserver {
    drop_expired: bool,
    received: AtomicU64,
}

impl Observer for PrintObserver {
    fn notify(&self, payload: &Payload) {
        let count = self.received.fetch_add(1, Ordering::Relaxed) + 1;
        println!(
            "{} {}",
            chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
            format!("payload {}", count).bold()
        );
        println!("{}", render_json(payload.as_value()));
    }

    fn drop_expired_callback(&self) -> bool {
        self.drop_expired
    }
}

/// Run the watch loop until `q`, Ctrl-C or a rejected session
pub async fn handle_watch(args: WatchArgs, config: &Config) -> Result<()> {
    let client = Arc::new(DashboardClient::new(&config.server_url));
    let resolver = Arc::new(ContextRoot::new(&config.context_root));

    let (login_tx, mut login_rx) = mpsc::unbounded_channel::<String>();
    let redirect = move |url: &str| {
        let _ = login_tx.send(url.to_string());
    };

    let policy = if args.skip_observer {
        DeliveryPolicy::SkipObserver
    } else {
        DeliveryPolicy::HaltCycle
    };
    let executor_config = ExecutorConfig::new()
        .with_interval(Duration::from_millis(args.interval_ms))
        .with_abort_superseded(args.abort_superseded)
        .with_delivery_policy(policy);

    let mut builder = PollingExecutor::builder(&args.path, client.clone())
        .with_resolver(resolver.clone())
        .with_config(executor_config)
        .with_login_redirect(Arc::new(redirect))
        .with_login_url(client.login_url(resolver.as_ref()));

    if let Some(condition) = args.pause_when {
        builder = builder.with_pause_condition(move |payload| condition.matches(payload));
    }

    let executor = builder.build().context("Invalid polling configuration")?;
    executor.register(Arc::new(PrintObserver {
        drop_expired: args.drop_expired,
        received: AtomicU64::new(0),
    }));

    info!(
        "Watching {}{} every {} ms",
        client.base_url(),
        executor.url(),
        args.interval_ms
    );
    print_help();

    executor.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        if !handle_key(line.trim(), &executor) {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            Some(login_url) = login_rx.recv() => {
                println!(
                    "{} Log in at {}",
                    "Session rejected.".red().bold(),
                    login_url.underline()
                );
                executor.shutdown();
                anyhow::bail!("Server requires authentication");
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    executor.shutdown();
    Ok(())
}

/// Apply one stdin command; returns false to quit
fn handle_key(key: &str, executor: &PollingExecutor) -> bool {
    match key {
        "" => {}
        "r" => {
            executor.fire_now();
            println!("{}", "Refreshing".cyan());
        }
        "p" => {
            executor.pause();
            println!("{}", "Paused".yellow());
        }
        "c" => {
            executor.resume();
            executor.start();
            println!("{}", "Resumed".green());
        }
        "s" => {
            executor.stop();
            println!("{}", "Timer cancelled".yellow());
        }
        "i" => print_status(executor),
        "q" => return false,
        _ => print_help(),
    }
    true
}

fn print_status(executor: &PollingExecutor) {
    let stats = executor.stats();
    println!("  State:       {}", colorize_state(executor.state()));
    println!("  Requests:    {}", stats.requests_issued);
    println!("  Succeeded:   {}", stats.succeeded);
    println!("  Deliveries:  {}", stats.deliveries);
    if let Some(at) = stats.last_completed_at {
        println!(
            "  Last poll:   {}",
            at.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed()
        );
    }
}

fn print_help() {
    println!(
        "{}",
        "Commands: r refresh, p pause, c resume, s stop timer, i status, q quit".dimmed()
    );
}
