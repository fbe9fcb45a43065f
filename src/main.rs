use std::path::PathBuf;

use tokio::sync::watch;
use tunnelvisor::config;
use tunnelvisor::Supervisor;

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt().init();

	let config_path = std::env::args()
		.nth(1)
		.map(PathBuf::from)
		.unwrap_or_else(|| PathBuf::from("tunnelvisor.toml"));
	let config = config::load_config(&config_path);

	let mut supervisor = match Supervisor::new(config) {
		Ok(s) => s,
		Err(e) => {
			tracing::error!("{}", e);
			std::process::exit(1);
		}
	};

	let (cancel_tx, cancel_rx) = watch::channel(false);
	let run = supervisor.run(cancel_rx);
	tokio::pin!(run);

	tokio::select! {
		_ = &mut run => {}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("interrupt received, shutting down");
			let _ = cancel_tx.send(true);
			// Let the supervisor terminate both children before exiting.
			run.await;
		}
	}

	tracing::info!("supervisor stopped");
}
