//! Per-document request state and staleness gating.
//!
//! [`RequestCoordinator`] tracks, for every checked document, the generation
//! of the latest issued request, whether that request is still pending, and
//! the snapshot it was issued against. Requests run as spawned tasks that only
//! perform I/O and report back through the engine's event channel; whether an
//! answer is still wanted is decided here when it arrives.
//!
//! Generations come from a single counter shared by all documents, so a
//! generation is never reused even when a document is untracked and tracked
//! again.

use std::collections::HashMap;
use std::sync::Arc;

use proofmark_primitives::{DocumentId, TextSnapshot};
use proofmark_service::AnalysisService;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::event::{CheckCompletion, CheckTicket, EngineEvent};


/// Request state for one tracked document.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
	/// Generation of the most recently issued request (0 before the first).
	pub generation: u64,
	/// Generation still awaiting an answer, if any.
	pub pending_generation: Option<u64>,
	/// Text the most recent request was issued against.
	pub last_checked: Option<TextSnapshot>,
}

impl CoordinatorState {
	pub fn is_pending(&self) -> bool {
		self.pending_generation.is_some()
	}
}

pub struct RequestCoordinator {
	states: HashMap<DocumentId, CoordinatorState>,
	issued: u64,
	service: Arc<dyn AnalysisService>,
	events: mpsc::UnboundedSender<EngineEvent>,
}

impl std::fmt::Debug for RequestCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RequestCoordinator")
			.field("docs", &self.states.len())
			.field("issued", &self.issued)
			.finish()
	}
}

impl RequestCoordinator {
	pub fn new(service: Arc<dyn AnalysisService>, events: mpsc::UnboundedSender<EngineEvent>) -> Self {
		Self {
			states: HashMap::new(),
			issued: 0,
			service,
			events,
		}
	}

	/// Starts tracking `doc`. Returns `false` if it was already tracked.
	pub fn track(&mut self, doc: DocumentId) -> bool {
		if self.states.contains_key(&doc) {
			return false;
		}
		self.states.insert(doc, CoordinatorState::default());
		true
	}

	pub fn is_tracked(&self, doc: DocumentId) -> bool {
		self.states.contains_key(&doc)
	}

	/// Forgets `doc`. Any answer still in flight for it will be discarded.
	pub fn untrack(&mut self, doc: DocumentId) -> Option<CoordinatorState> {
		self.states.remove(&doc)
	}

	/// Forgets every document.
	pub fn clear(&mut self) {
		self.states.clear();
	}

	pub fn tracked(&self) -> impl Iterator<Item = DocumentId> + '_ {
		self.states.keys().copied()
	}

	pub fn state(&self, doc: DocumentId) -> Option<&CoordinatorState> {
		self.states.get(&doc)
	}

	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn in_flight_count(&self) -> usize {
		self.states.values().filter(|s| s.is_pending()).count()
	}

	/// Records a new request for `doc` against `snapshot`.
	///
	/// Supersedes any request still pending. Returns the new generation, or
	/// `None` if `doc` is not tracked.
	pub fn begin(&mut self, doc: DocumentId, snapshot: TextSnapshot) -> Option<u64> {
		let state = self.states.get_mut(&doc)?;
		self.issued += 1;
		state.generation = self.issued;
		state.pending_generation = Some(self.issued);
		state.last_checked = Some(snapshot);
		Some(self.issued)
	}

	/// Accepts the answer for `generation` if it is the one still pending.
	///
	/// Returns the snapshot the request was issued against; the answer's
	/// offsets index that text.
	pub fn accept(&mut self, doc: DocumentId, generation: u64) -> Option<TextSnapshot> {
		let state = self.states.get_mut(&doc)?;
		if state.pending_generation != Some(generation) {
			return None;
		}
		state.pending_generation = None;
		state.last_checked.clone()
	}

	/// Abandons a failed request. A newer pending request is left alone.
	pub fn abandon(&mut self, doc: DocumentId, generation: u64) -> bool {
		let Some(state) = self.states.get_mut(&doc) else {
			return false;
		};
		if state.pending_generation != Some(generation) {
			return false;
		}
		state.pending_generation = None;
		true
	}

	/// Issues an analysis request for `doc` and returns its ticket.
	///
	/// The answer arrives later as [`EngineEvent::CheckCompleted`]. Untracked
	/// documents are ignored.
	pub fn request_check(&mut self, doc: DocumentId, snapshot: TextSnapshot, epoch: u64) -> Option<CheckTicket> {
		if !self.is_tracked(doc) {
			trace!(%doc, "engine.check.untracked");
			return None;
		}
		let text = snapshot.to_string();
		let chars = snapshot.len_chars();
		let generation = self.begin(doc, snapshot)?;
		let ticket = CheckTicket { doc, generation, epoch };
		debug!(%doc, generation, epoch, chars, "engine.check.issued");

		let service = Arc::clone(&self.service);
		let events = self.events.clone();
		tokio::spawn(async move {
			let result = service.check(text).await;
			if events.send(EngineEvent::CheckCompleted(CheckCompletion { ticket, result })).is_err() {
				trace!(doc = %ticket.doc, generation = ticket.generation, "engine.check.orphaned");
			}
		});

		Some(ticket)
	}
}
