//! Grammar analysis service client.
//!
//! The service accepts a document's full text and answers with a flat list of
//! error descriptors. It is treated as a black box with arbitrary latency and
//! no ordering guarantee between concurrent requests; callers are expected to
//! tag requests themselves and discard stale answers.
//!
//! [`AnalysisService`] is the seam the engine talks to. [`HttpAnalysisClient`]
//! is the production implementation speaking JSON over HTTP POST.

pub mod client;
pub mod error;
pub mod wire;

use async_trait::async_trait;

pub use client::HttpAnalysisClient;
pub use error::{ServiceError, ServiceResult};
pub use wire::{CheckRequest, ErrorDescriptor};

/// Remote analysis of a document's full text.
#[async_trait]
pub trait AnalysisService: Send + Sync {
	/// Submits `text` and returns the findings reported for it.
	///
	/// Offsets in the returned descriptors index the exact text submitted.
	async fn check(&self, text: String) -> ServiceResult<Vec<ErrorDescriptor>>;
}
