use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::process::Role;

#[derive(Debug, Error)]
pub enum Error {
	#[error("failed to spawn {role}: {source}")]
	Spawn { role: Role, source: io::Error },

	#[error("invalid tunnel URL pattern: {0}")]
	Pattern(#[from] regex::Error),

	#[error("http client error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("no tunnel URL within {0:?}")]
	UrlTimeout(Duration),

	#[error("tunnel output closed before a URL appeared")]
	OutputClosed,

	#[error("service not ready within {0:?}")]
	StartupTimeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
