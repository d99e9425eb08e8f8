//! Dashpoll Executor
//!
//! A periodic polling executor for dashboards. It fetches a JSON document
//! on a fixed interval, fans each payload out to registered observers,
//! and supports pausing, resuming and forced refreshes.
//!
//! Architecture:
//! - Config: interval, abort and delivery behaviour
//! - Observers: ordered listeners removed by identity
//! - Executor: the poll cycle, timer bookkeeping and staleness checks
//! - Auth: what happens when the server answers 401
//!
//! # Example
//!
//! ```no_run
//! use dashpoll_client::DashboardClient;
//! use dashpoll_executor::{FnObserver, PollingExecutor};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(DashboardClient::new("http://localhost:8153"));
//!     let executor = PollingExecutor::builder("agents.json", client)
//!         .with_pause_condition(|payload| payload.get("done").is_some())
//!         .build()?;
//!
//!     executor.register(Arc::new(FnObserver::new(|payload| {
//!         println!("{}", payload.as_value());
//!     })));
//!     executor.start();
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod executor;
pub mod observer;
pub mod stats;

pub use auth::{LogLoginRedirect, LoginRedirect};
pub use config::{ConfigError, DEFAULT_INTERVAL, DeliveryPolicy, ExecutorConfig};
pub use executor::{ExecutorBuilder, ExecutorState, PauseCondition, PollingExecutor};
pub use observer::{FnObserver, Observer, ObserverList};
pub use stats::PollStats;
