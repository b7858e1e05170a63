//! Configuration for Proofmark.
//!
//! Configuration is written in TOML. Every key is optional; missing keys take
//! the defaults shown below.
//!
//! ```toml
//! # Active-document poll cadence.
//! refresh_ms = 1000
//! # Quiet period after the last edit before a document is re-checked.
//! callback_refresh_ms = 300
//! # Whether checking starts enabled.
//! enabled = true
//! # Content kinds the poller attaches to.
//! content_kinds = ["markdown"]
//!
//! [service]
//! endpoint = "http://localhost:5000/check"
//! timeout_ms = 30000
//! # Unit the service counts offsets in: utf8, utf16, or utf32.
//! offset_encoding = "utf32"
//! ```
//!
//! # Configuration Files
//!
//! Proofmark looks for `$XDG_CONFIG_HOME/proofmark/config.toml` (or the
//! platform equivalent). A missing file is not an error.

pub mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use error::{ConfigError, Result};
use proofmark_primitives::OffsetEncoding;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default poll cadence in milliseconds.
pub const DEFAULT_REFRESH_MS: u64 = 1000;

/// Default debounce window in milliseconds.
pub const DEFAULT_CALLBACK_REFRESH_MS: u64 = 300;

/// Endpoint a locally running analysis service listens on.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/check";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Content kind checked when none is configured.
pub const MARKDOWN_KIND: &str = "markdown";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Active-document poll cadence in milliseconds.
	pub refresh_ms: u64,
	/// Debounce window in milliseconds.
	pub callback_refresh_ms: u64,
	/// Initial state of the checking toggle.
	pub enabled: bool,
	/// Content kinds the poller attaches to.
	pub content_kinds: Vec<String>,
	/// Analysis service connection.
	pub service: ServiceConfig,
}

/// Analysis service connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
	pub endpoint: String,
	pub timeout_ms: u64,
	pub offset_encoding: OffsetEncoding,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			refresh_ms: DEFAULT_REFRESH_MS,
			callback_refresh_ms: DEFAULT_CALLBACK_REFRESH_MS,
			enabled: true,
			content_kinds: vec![MARKDOWN_KIND.to_string()],
			service: ServiceConfig::default(),
		}
	}
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_string(),
			timeout_ms: DEFAULT_TIMEOUT_MS,
			offset_encoding: OffsetEncoding::default(),
		}
	}
}

impl Config {
	/// Parse and validate a TOML string.
	pub fn parse(input: &str) -> Result<Self> {
		let config: Config = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::parse(&content)
	}

	/// Load configuration from a file, falling back to defaults when the file
	/// does not exist.
	///
	/// Any other failure (unreadable file, bad syntax, invalid values) is
	/// still reported.
	pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		if !path.exists() {
			return Ok(Self::default());
		}
		Self::load(path)
	}

	/// Platform config location: `<config_dir>/proofmark/config.toml`.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("proofmark").join("config.toml"))
	}

	/// Checks values that parse but cannot be used.
	pub fn validate(&self) -> Result<()> {
		if self.refresh_ms == 0 {
			return Err(ConfigError::invalid("refresh_ms", "must be greater than zero"));
		}
		if self.callback_refresh_ms == 0 {
			return Err(ConfigError::invalid("callback_refresh_ms", "must be greater than zero"));
		}
		if self.content_kinds.is_empty() {
			return Err(ConfigError::invalid("content_kinds", "at least one content kind is required"));
		}
		if self.service.timeout_ms == 0 {
			return Err(ConfigError::invalid("service.timeout_ms", "must be greater than zero"));
		}

		let endpoint = Url::parse(&self.service.endpoint)
			.map_err(|e| ConfigError::invalid("service.endpoint", e.to_string()))?;
		if !matches!(endpoint.scheme(), "http" | "https") {
			return Err(ConfigError::invalid(
				"service.endpoint",
				format!("unsupported scheme `{}`", endpoint.scheme()),
			));
		}

		Ok(())
	}

	pub fn refresh_interval(&self) -> Duration {
		Duration::from_millis(self.refresh_ms)
	}

	pub fn debounce_interval(&self) -> Duration {
		Duration::from_millis(self.callback_refresh_ms)
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.service.timeout_ms)
	}
}

#[cfg(test)]
mod tests;
