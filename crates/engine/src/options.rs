use std::time::Duration;

use proofmark_config::{Config, DEFAULT_CALLBACK_REFRESH_MS, DEFAULT_REFRESH_MS, MARKDOWN_KIND};
use proofmark_primitives::OffsetEncoding;

/// Runtime settings for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
	/// Active-document poll period.
	pub refresh: Duration,
	/// Quiet period after the last edit before a document is rechecked.
	pub debounce: Duration,
	/// Whether checking starts enabled.
	pub enabled: bool,
	/// Content kinds that are checked.
	pub content_kinds: Vec<String>,
	/// Unit the service counts offsets in.
	pub offset_encoding: OffsetEncoding,
}

impl Default for EngineOptions {
	fn default() -> Self {
		Self {
			refresh: Duration::from_millis(DEFAULT_REFRESH_MS),
			debounce: Duration::from_millis(DEFAULT_CALLBACK_REFRESH_MS),
			enabled: true,
			content_kinds: vec![MARKDOWN_KIND.to_string()],
			offset_encoding: OffsetEncoding::default(),
		}
	}
}

impl From<&Config> for EngineOptions {
	fn from(config: &Config) -> Self {
		Self {
			refresh: config.refresh_interval(),
			debounce: config.debounce_interval(),
			enabled: config.enabled,
			content_kinds: config.content_kinds.clone(),
			offset_encoding: config.service.offset_encoding,
		}
	}
}
