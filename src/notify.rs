use std::time::Duration;

use serde::Serialize;

use crate::error::Result;

/// Immutable webhook payload. `content` is the only required field.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
	pub content: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
}

impl Message {
	pub fn new(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			username: None,
		}
	}
}

/// Best-effort delivery to an external webhook channel. Failures are
/// logged and swallowed; notification never affects supervision state.
pub struct Notifier {
	client: reqwest::Client,
	webhook_url: Option<String>,
}

impl Notifier {
	pub fn new(webhook_url: Option<String>) -> Result<Self> {
		// Discord rejects webhook posts without a User-Agent.
		let client = reqwest::Client::builder()
			.user_agent(concat!("tunnelvisor/", env!("CARGO_PKG_VERSION")))
			.timeout(Duration::from_secs(10))
			.build()?;
		Ok(Self {
			client,
			webhook_url,
		})
	}

	pub async fn notify(&self, message: &Message) {
		let Some(url) = &self.webhook_url else {
			tracing::debug!("no webhook configured, skipping: {}", message.content);
			return;
		};

		match self.client.post(url).json(message).send().await {
			Ok(resp) if resp.status().is_success() => {}
			Ok(resp) => tracing::warn!("webhook returned {}", resp.status()),
			Err(e) => tracing::warn!("webhook delivery failed: {}", e),
		}
	}
}
