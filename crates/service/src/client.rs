//! HTTP client for the analysis endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, trace};
use url::Url;

use crate::error::{ServiceError, ServiceResult};
use crate::wire::{CheckRequest, ErrorDescriptor};
use crate::AnalysisService;

/// Analysis service reached over HTTP POST with a JSON body.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
	http: Client,
	endpoint: Url,
}

impl HttpAnalysisClient {
	/// Creates a client for `endpoint`, which must be an absolute http(s) URL.
	pub fn new(endpoint: &str, timeout: Duration) -> ServiceResult<Self> {
		let endpoint = parse_endpoint(endpoint)?;
		let http = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ServiceError::Client(e.to_string()))?;

		Ok(Self { http, endpoint })
	}

	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}
}

fn parse_endpoint(raw: &str) -> ServiceResult<Url> {
	let endpoint = Url::parse(raw).map_err(|e| ServiceError::InvalidEndpoint {
		endpoint: raw.to_string(),
		reason: e.to_string(),
	})?;

	match endpoint.scheme() {
		"http" | "https" => Ok(endpoint),
		other => Err(ServiceError::InvalidEndpoint {
			endpoint: raw.to_string(),
			reason: format!("unsupported scheme `{other}`"),
		}),
	}
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
	async fn check(&self, text: String) -> ServiceResult<Vec<ErrorDescriptor>> {
		trace!(endpoint = %self.endpoint, chars = text.chars().count(), "service.check.send");

		let response = self
			.http
			.post(self.endpoint.clone())
			.header(CONTENT_TYPE, "application/json")
			.json(&CheckRequest { markdown: &text })
			.send()
			.await
			.map_err(ServiceError::from_reqwest)?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ServiceError::Status {
				status: status.as_u16(),
				body,
			});
		}

		let body = response.bytes().await.map_err(ServiceError::from_reqwest)?;
		let descriptors: Vec<ErrorDescriptor> =
			serde_json::from_slice(&body).map_err(|e| ServiceError::Decode(e.to_string()))?;

		debug!(endpoint = %self.endpoint, findings = descriptors.len(), "service.check.done");
		Ok(descriptors)
	}
}
