//! JSON shapes exchanged with the analysis service.

use serde::{Deserialize, Serialize};

/// Request body: `{ "markdown": <full document text> }`.
#[derive(Debug, Serialize)]
pub struct CheckRequest<'a> {
	pub markdown: &'a str,
}

/// One finding reported by the service.
///
/// Offsets are kept signed so a misbehaving service cannot fail the whole
/// response; range validation happens when the descriptor is turned into an
/// annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
	pub offset: i64,
	#[serde(rename = "errorLength")]
	pub error_length: i64,
	pub message: String,
}

impl ErrorDescriptor {
	pub fn new(offset: i64, error_length: i64, message: impl Into<String>) -> Self {
		Self {
			offset,
			error_length,
			message: message.into(),
		}
	}
}
