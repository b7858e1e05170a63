//! Active-document discovery.
//!
//! Polling is level-triggered: every tick re-reads the host's active document
//! and only acts on documents not yet tracked, so a missed tick costs nothing.

use std::time::Duration;

use proofmark_primitives::DocumentId;
use tokio::time::{Interval, MissedTickBehavior};

use crate::coordinator::RequestCoordinator;
use crate::host::HostEditor;

/// What a poll tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
	/// The host has no active document.
	NoActiveDocument,
	/// The active document's content kind is not checked.
	Unsupported { doc: DocumentId, kind: Option<String> },
	/// Checking is disabled.
	Disabled { doc: DocumentId },
	/// The active document is already tracked.
	AlreadyTracked { doc: DocumentId },
	/// The active document was newly attached; `generation` is the initial
	/// request, if its text could be read.
	Attached { doc: DocumentId, generation: Option<u64> },
}

/// Decision reached before any state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollDecision {
	Skip(PollOutcome),
	Attach(DocumentId),
}

#[derive(Debug, Clone)]
pub struct ActiveDocumentPoller {
	kinds: Vec<String>,
}

impl ActiveDocumentPoller {
	pub fn new(kinds: Vec<String>) -> Self {
		Self { kinds }
	}

	pub fn is_checkable(&self, kind: &str) -> bool {
		self.kinds.iter().any(|k| k == kind)
	}

	pub fn decide<H: HostEditor + ?Sized>(
		&self,
		host: &H,
		enabled: bool,
		coordinator: &RequestCoordinator,
	) -> PollDecision {
		let Some(doc) = host.active_document() else {
			return PollDecision::Skip(PollOutcome::NoActiveDocument);
		};
		let kind = host.content_kind(doc);
		if !kind.as_deref().is_some_and(|k| self.is_checkable(k)) {
			return PollDecision::Skip(PollOutcome::Unsupported { doc, kind });
		}
		if !enabled {
			return PollDecision::Skip(PollOutcome::Disabled { doc });
		}
		if coordinator.is_tracked(doc) {
			return PollDecision::Skip(PollOutcome::AlreadyTracked { doc });
		}
		PollDecision::Attach(doc)
	}
}

/// Poll cadence. Missed ticks are skipped rather than replayed in a burst;
/// the first tick completes immediately.
pub fn poll_interval(period: Duration) -> Interval {
	let mut interval = tokio::time::interval(period);
	interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
	interval
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use tokio::sync::mpsc;

	use super::*;
	use crate::test_support::{FakeHost, ScriptedService};

	fn poller() -> ActiveDocumentPoller {
		ActiveDocumentPoller::new(vec!["markdown".to_string()])
	}

	fn coordinator() -> RequestCoordinator {
		let (tx, _rx) = mpsc::unbounded_channel();
		RequestCoordinator::new(Arc::new(ScriptedService::new()), tx)
	}

	#[test]
	fn test_no_active_document() {
		let host = FakeHost::new();
		assert_eq!(
			poller().decide(&host, true, &coordinator()),
			PollDecision::Skip(PollOutcome::NoActiveDocument)
		);
	}

	#[test]
	fn test_unsupported_kind_is_skipped() {
		let host = FakeHost::new();
		host.open(DocumentId(1), "rust", "fn main() {}");
		assert_eq!(
			poller().decide(&host, true, &coordinator()),
			PollDecision::Skip(PollOutcome::Unsupported {
				doc: DocumentId(1),
				kind: Some("rust".to_string()),
			})
		);
	}

	#[test]
	fn test_disabled_and_tracked() {
		let host = FakeHost::new();
		host.open(DocumentId(1), "markdown", "# hi");
		let mut coord = coordinator();

		assert_eq!(
			poller().decide(&host, false, &coord),
			PollDecision::Skip(PollOutcome::Disabled { doc: DocumentId(1) })
		);
		assert_eq!(poller().decide(&host, true, &coord), PollDecision::Attach(DocumentId(1)));

		coord.track(DocumentId(1));
		assert_eq!(
			poller().decide(&host, true, &coord),
			PollDecision::Skip(PollOutcome::AlreadyTracked { doc: DocumentId(1) })
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_poll_interval_skips_missed_ticks() {
		let start = tokio::time::Instant::now();
		let mut interval = poll_interval(Duration::from_secs(1));

		interval.tick().await;
		assert_eq!(start.elapsed(), Duration::ZERO);

		tokio::time::advance(Duration::from_millis(3500)).await;
		interval.tick().await;
		interval.tick().await;
		assert_eq!(start.elapsed(), Duration::from_secs(4));
	}
}
