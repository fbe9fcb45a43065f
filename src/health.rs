use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Polls the service's health endpoint until it responds successfully,
/// retrying on connection failure or non-2xx with `interval` between
/// attempts. Never reports ready before one successful response.
///
/// With `max_wait` unset the wait is unbounded (the service is local and
/// expected to come up). When set, exceeding it returns
/// [`Error::StartupTimeout`] so the caller can surface a startup failure
/// instead of looping forever.
pub async fn wait_ready(url: &str, interval: Duration, max_wait: Option<Duration>) -> Result<()> {
	let client = Client::builder().timeout(Duration::from_secs(2)).build()?;
	let started = Instant::now();
	let mut attempt: u32 = 0;

	loop {
		attempt += 1;
		match client.get(url).send().await {
			Ok(resp) if resp.status().is_success() => {
				tracing::info!("service ready at {} (attempt {})", url, attempt);
				return Ok(());
			}
			Ok(resp) => {
				tracing::debug!("health check returned {}, retrying", resp.status());
			}
			Err(e) => {
				tracing::debug!("health check failed ({}), retrying", e);
			}
		}

		if let Some(max) = max_wait {
			if started.elapsed() >= max {
				return Err(Error::StartupTimeout(max));
			}
		}
		sleep(interval).await;
	}
}
