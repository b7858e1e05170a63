//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or an unexpected key/value shape.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value parsed but is not acceptable.
	#[error("invalid value for `{field}`: {reason}")]
	Invalid {
		/// Dotted key of the offending option.
		field: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
}

impl ConfigError {
	pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
		Self::Invalid {
			field,
			reason: reason.into(),
		}
	}
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
