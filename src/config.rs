use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::tunnel::DEFAULT_URL_PATTERN;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
	#[serde(default)]
	pub service: ServiceConfig,
	#[serde(default)]
	pub tunnel: TunnelConfig,
	#[serde(default)]
	pub supervisor: SupervisorConfig,
	#[serde(default)]
	pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
	#[serde(default = "default_service_command")]
	pub command: String,
	#[serde(default = "default_dir")]
	pub dir: PathBuf,
	#[serde(default = "default_health_url")]
	pub health_url: String,
	#[serde(default = "default_probe_interval")]
	pub probe_interval_secs: u64,
	/// Unset = wait for readiness forever.
	pub max_ready_wait_secs: Option<u64>,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			command: default_service_command(),
			dir: default_dir(),
			health_url: default_health_url(),
			probe_interval_secs: default_probe_interval(),
			max_ready_wait_secs: None,
		}
	}
}

fn default_service_command() -> String {
	"uvicorn backend.server:app --host 0.0.0.0".into()
}
fn default_dir() -> PathBuf {
	PathBuf::from(".")
}
fn default_health_url() -> String {
	"http://127.0.0.1:8000/health".into()
}
fn default_probe_interval() -> u64 {
	1
}

#[derive(Debug, Clone, Deserialize)]
pub struct TunnelConfig {
	#[serde(default = "default_tunnel_command")]
	pub command: String,
	#[serde(default = "default_dir")]
	pub dir: PathBuf,
	#[serde(default = "default_url_pattern")]
	pub url_pattern: String,
	#[serde(default = "default_url_timeout")]
	pub url_timeout_secs: u64,
}

impl Default for TunnelConfig {
	fn default() -> Self {
		Self {
			command: default_tunnel_command(),
			dir: default_dir(),
			url_pattern: default_url_pattern(),
			url_timeout_secs: default_url_timeout(),
		}
	}
}

fn default_tunnel_command() -> String {
	"cloudflared tunnel --url http://localhost:8000".into()
}
fn default_url_pattern() -> String {
	DEFAULT_URL_PATTERN.into()
}
fn default_url_timeout() -> u64 {
	60
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorConfig {
	/// Scheduled full-cycle refresh period.
	#[serde(default = "default_refresh")]
	pub refresh_secs: u64,
	#[serde(default = "default_poll_interval")]
	pub poll_interval_secs: u64,
	/// Grace between SIGTERM and SIGKILL.
	#[serde(default = "default_grace")]
	pub grace_secs: u64,
}

impl Default for SupervisorConfig {
	fn default() -> Self {
		Self {
			refresh_secs: default_refresh(),
			poll_interval_secs: default_poll_interval(),
			grace_secs: default_grace(),
		}
	}
}

fn default_refresh() -> u64 {
	2 * 60 * 60
}
fn default_poll_interval() -> u64 {
	5
}
fn default_grace() -> u64 {
	5
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotifyConfig {
	pub webhook_url: Option<String>,
}

/// Reads the config file, falling back to defaults on a missing or
/// unparseable file. The webhook URL may also come from the
/// `DISCORD_WEBHOOK_URL` environment variable.
pub fn load_config(path: &Path) -> Config {
	let mut config = Config::default();

	if path.exists() {
		match std::fs::read_to_string(path) {
			Ok(content) => match toml::from_str(&content) {
				Ok(parsed) => config = parsed,
				Err(e) => tracing::warn!("failed to parse {}: {}", path.display(), e),
			},
			Err(e) => tracing::warn!("failed to read {}: {}", path.display(), e),
		}
	}

	if config.notify.webhook_url.is_none() {
		config.notify.webhook_url = std::env::var("DISCORD_WEBHOOK_URL").ok();
	}

	config
}
