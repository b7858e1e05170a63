//! The engine facade.
//!
//! [`Engine`] owns every piece of process-wide checking state and is the only
//! place that mutates it. It is not itself asynchronous: the
//! [`EngineDriver`](crate::EngineDriver) feeds it poll ticks, debounce
//! deadlines and events one at a time, and tests can do the same by hand.
//!
//! # Staleness
//!
//! Every request carries a [`CheckTicket`]. An answer is applied only when its
//! epoch matches the engine's (the engine has not been disabled since issue)
//! and its generation is still the pending one for the document. Anything
//! else is dropped without touching rendered state.

use std::sync::Arc;

use proofmark_primitives::DocumentId;
use proofmark_service::AnalysisService;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::annotation::annotations_from_descriptors;
use crate::coordinator::RequestCoordinator;
use crate::debounce::TriggerSet;
use crate::event::{CheckCompletion, CheckTicket, EngineEvent};
use crate::host::{ChangeNotifier, HostEditor};
use crate::options::EngineOptions;
use crate::poller::{ActiveDocumentPoller, PollDecision, PollOutcome};
use crate::store::{AnnotationStore, RenderedAnnotation};


/// How an analysis answer was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
	/// Annotations were replaced. `dropped` counts findings that could not be
	/// rendered.
	Applied { rendered: usize, dropped: usize },
	/// The answer was superseded or outlived a disable, and was ignored.
	Stale,
	/// The request failed; rendered annotations were left as they were.
	Failed,
}

pub struct Engine<H> {
	host: H,
	options: EngineOptions,
	enabled: bool,
	epoch: u64,
	poller: ActiveDocumentPoller,
	coordinator: RequestCoordinator,
	store: AnnotationStore,
	triggers: TriggerSet,
	events: mpsc::UnboundedSender<EngineEvent>,
}

impl<H> std::fmt::Debug for Engine<H> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Engine")
			.field("enabled", &self.enabled)
			.field("epoch", &self.epoch)
			.field("tracked", &self.coordinator.len())
			.field("triggers", &self.triggers.len())
			.field("rendered", &self.store.total())
			.finish_non_exhaustive()
	}
}

impl<H: HostEditor> Engine<H> {
	/// Creates an engine. Events it produces (change notifications, request
	/// completions) are sent to `events`; the owner feeds them back through
	/// [`handle_event`](Self::handle_event).
	pub fn new(
		host: H,
		service: Arc<dyn AnalysisService>,
		options: EngineOptions,
		events: mpsc::UnboundedSender<EngineEvent>,
	) -> Self {
		Self {
			host,
			enabled: options.enabled,
			epoch: 0,
			poller: ActiveDocumentPoller::new(options.content_kinds.clone()),
			coordinator: RequestCoordinator::new(service, events.clone()),
			store: AnnotationStore::new(),
			triggers: TriggerSet::new(options.debounce),
			events,
			options,
		}
	}

	pub fn into_host(self) -> H {
		self.host
	}

	pub fn options(&self) -> &EngineOptions {
		&self.options
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Bumped on every disable and on shutdown.
	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	pub fn is_tracked(&self, doc: DocumentId) -> bool {
		self.coordinator.is_tracked(doc)
	}

	pub fn tracked_count(&self) -> usize {
		self.coordinator.len()
	}

	pub fn in_flight_count(&self) -> usize {
		self.coordinator.in_flight_count()
	}

	/// Annotations currently rendered for `doc`.
	pub fn annotations(&self, doc: DocumentId) -> &[RenderedAnnotation] {
		self.store.rendered(doc)
	}

	/// Turns checking on or off. Returns `false` if nothing changed.
	///
	/// Disabling releases every rendered span, detaches every trigger, and
	/// forgets every document before returning. Enabling checks nothing by
	/// itself; documents are picked up by later poll ticks.
	pub fn set_enabled(&mut self, enabled: bool) -> bool {
		if self.enabled == enabled {
			return false;
		}
		if enabled {
			self.enabled = true;
			info!(epoch = self.epoch, "engine.enabled");
		} else {
			self.enabled = false;
			let cleared = self.teardown();
			info!(epoch = self.epoch, cleared, "engine.disabled");
		}
		true
	}

	/// Flips checking and returns the new state.
	pub fn toggle(&mut self) -> bool {
		let next = !self.enabled;
		self.set_enabled(next);
		next
	}

	/// One poll tick: evicts closed documents, then attaches the active
	/// document if it is checkable and not yet tracked.
	pub fn poll_tick(&mut self) -> PollOutcome {
		self.evict_closed();

		let doc = match self.poller.decide(&self.host, self.enabled, &self.coordinator) {
			PollDecision::Attach(doc) => doc,
			PollDecision::Skip(outcome) => {
				match &outcome {
					PollOutcome::Unsupported { doc, kind } => {
						debug!(%doc, kind = kind.as_deref().unwrap_or("<none>"), "engine.poll.unsupported");
					}
					other => trace!(outcome = ?other, "engine.poll.skip"),
				}
				return outcome;
			}
		};

		self.coordinator.track(doc);
		let notifier = ChangeNotifier::new(doc, self.events.clone());
		let subscription = self.host.subscribe_text_changed(doc, notifier);
		if let Some(replaced) = self.triggers.attach(doc, subscription) {
			self.host.unsubscribe(replaced);
		}

		let generation = self.check_now(doc).map(|ticket| ticket.generation);
		info!(%doc, ?generation, "engine.poll.attached");
		PollOutcome::Attached { doc, generation }
	}

	/// Records an edit to `doc` at `now`. Returns `false` if the document has
	/// no trigger attached.
	pub fn on_text_changed(&mut self, doc: DocumentId, now: Instant) -> bool {
		if !self.enabled {
			return false;
		}
		let known = self.triggers.notify(doc, now);
		trace!(%doc, known, "engine.debounce.touch");
		known
	}

	/// Earliest instant at which [`fire_due`](Self::fire_due) has work.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.triggers.next_deadline()
	}

	/// Issues a check for every document whose quiet period has ended,
	/// reading its text now. Returns the number of requests issued.
	pub fn fire_due(&mut self, now: Instant) -> usize {
		if !self.enabled {
			return 0;
		}
		let due = self.triggers.take_due(now);
		due.into_iter()
			.filter(|doc| self.check_now(*doc).is_some())
			.count()
	}

	/// Applies or discards an analysis answer.
	pub fn handle_completion(&mut self, completion: CheckCompletion) -> CompletionOutcome {
		let CheckCompletion { ticket, result } = completion;
		let CheckTicket { doc, generation, epoch } = ticket;

		if epoch != self.epoch {
			trace!(%doc, generation, epoch, current = self.epoch, "engine.check.stale");
			return CompletionOutcome::Stale;
		}

		let descriptors = match result {
			Ok(descriptors) => descriptors,
			Err(error) => {
				let abandoned = self.coordinator.abandon(doc, generation);
				warn!(%doc, generation, abandoned, %error, "engine.check.failed");
				return CompletionOutcome::Failed;
			}
		};

		let Some(snapshot) = self.coordinator.accept(doc, generation) else {
			trace!(%doc, generation, "engine.check.stale");
			return CompletionOutcome::Stale;
		};

		let annotations =
			annotations_from_descriptors(doc, &descriptors, &snapshot, self.options.offset_encoding);
		let rendered = self.store.replace(&mut self.host, doc, annotations, &snapshot);
		let dropped = descriptors.len() - rendered;
		debug!(%doc, generation, rendered, dropped, "engine.check.applied");
		CompletionOutcome::Applied { rendered, dropped }
	}

	/// Dispatches one event from the engine's channel.
	pub fn handle_event(&mut self, event: EngineEvent, now: Instant) {
		match event {
			EngineEvent::TextChanged(doc) => {
				self.on_text_changed(doc, now);
			}
			EngineEvent::CheckCompleted(completion) => {
				self.handle_completion(completion);
			}
			EngineEvent::SetEnabled(enabled) => {
				self.set_enabled(enabled);
			}
			EngineEvent::Toggle => {
				self.toggle();
			}
		}
	}

	/// Releases everything the engine holds in the host. Answers still in
	/// flight are ignored when they arrive.
	pub fn shutdown(&mut self) {
		let cleared = self.teardown();
		info!(cleared, "engine.shutdown");
	}

	fn check_now(&mut self, doc: DocumentId) -> Option<CheckTicket> {
		let Some(snapshot) = self.host.text(doc) else {
			debug!(%doc, "engine.check.no_text");
			return None;
		};
		self.coordinator.request_check(doc, snapshot, self.epoch)
	}

	fn evict_closed(&mut self) {
		let closed: Vec<DocumentId> = self
			.coordinator
			.tracked()
			.filter(|doc| !self.host.is_alive(*doc))
			.collect();
		for doc in closed {
			let cleared = self.store.clear_document(&mut self.host, doc);
			if let Some(subscription) = self.triggers.detach(doc) {
				self.host.unsubscribe(subscription);
			}
			self.coordinator.untrack(doc);
			debug!(%doc, cleared, "engine.poll.evicted");
		}
	}

	fn teardown(&mut self) -> usize {
		self.epoch += 1;
		let cleared = self.store.clear_all(&mut self.host);
		for subscription in self.triggers.detach_all() {
			self.host.unsubscribe(subscription);
		}
		self.coordinator.clear();
		cleared
	}
}
