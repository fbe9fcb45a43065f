use std::time::Duration;

use regex::Regex;
use tokio::time::{timeout_at, Instant};

use crate::error::{Error, Result};
use crate::output::OutputStream;

pub const DEFAULT_URL_PATTERN: &str = r"https://[a-z0-9-]+\.trycloudflare\.com";

/// Drains the tunnel's output stream in arrival order and returns the
/// first line fragment matching `pattern`. Gives up after `timeout`, or
/// earlier if the stream closes before a match appears. Both failures
/// are non-fatal to the caller: the cycle continues without a URL.
pub async fn extract_url(
	lines: &mut OutputStream,
	pattern: &Regex,
	timeout: Duration,
) -> Result<String> {
	let deadline = Instant::now() + timeout;

	loop {
		match timeout_at(deadline, lines.recv()).await {
			Ok(Some(line)) => {
				if let Some(m) = pattern.find(&line) {
					return Ok(m.as_str().to_string());
				}
				tracing::debug!("tunnel: {}", line);
			}
			Ok(None) => return Err(Error::OutputClosed),
			Err(_) => return Err(Error::UrlTimeout(timeout)),
		}
	}
}
