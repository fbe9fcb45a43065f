//! # tunnelvisor
//!
//! Keeps a local service continuously reachable from the public
//! internet: supervises the service process and the tunnel process that
//! exposes it, restarting either on failure or on a fixed schedule, and
//! reporting status changes to a webhook channel.
//!
//! The tunnel's dynamically assigned public URL is scraped from its
//! output stream with a bounded wait; a dead tunnel is replaced without
//! touching the service, while a dead service (or the scheduled
//! refresh) restarts both.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tokio::sync::watch;
//! use tunnelvisor::{Config, Supervisor};
//!
//! # #[tokio::main]
//! # async fn main() -> tunnelvisor::Result<()> {
//! let mut supervisor = Supervisor::new(Config::default())?;
//! let (cancel_tx, cancel_rx) = watch::channel(false);
//! supervisor.run(cancel_rx).await;
//! drop(cancel_tx);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod notify;
pub mod output;
pub mod process;
pub mod queue;
pub mod registry;
pub mod supervisor;
pub mod tunnel;
pub mod worker;

pub use config::Config;
pub use error::{Error, Result};
pub use notify::{Message, Notifier};
pub use process::{ProcessHandle, Role};
pub use queue::JobQueue;
pub use registry::UpdateRegistry;
pub use supervisor::{poll_event, CycleEvent, Supervisor};
pub use worker::{DownloadJob, Downloader, Track, TrackMeta, TrackStore, Worker};
