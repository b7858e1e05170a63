//! Error types for analysis requests.

use thiserror::Error;

/// Failure of a single analysis request.
///
/// Every variant is non-fatal to the caller: the request is abandoned and
/// the next trigger retries naturally.
#[derive(Debug, Error)]
pub enum ServiceError {
	/// The configured endpoint is not a usable URL.
	#[error("invalid endpoint {endpoint}: {reason}")]
	InvalidEndpoint { endpoint: String, reason: String },
	/// The HTTP client could not be constructed.
	#[error("failed to build http client: {0}")]
	Client(String),
	/// Connection, TLS, or transport failure.
	#[error("network error: {0}")]
	Network(String),
	/// The request did not complete within the configured timeout.
	#[error("request timed out")]
	Timeout,
	/// The service answered with a non-success status.
	#[error("service returned status {status}: {body}")]
	Status { status: u16, body: String },
	/// The response body was not a list of error descriptors.
	#[error("invalid response: {0}")]
	Decode(String),
}

impl ServiceError {
	pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			Self::Timeout
		} else if err.is_decode() {
			Self::Decode(err.to_string())
		} else {
			Self::Network(err.to_string())
		}
	}
}

/// Result type for analysis requests.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
