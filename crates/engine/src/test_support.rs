//! In-memory host and scripted analysis service for engine tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use proofmark_primitives::{DocumentId, Position, RenderHandle, SpanStyle, SubscriptionId, TextSnapshot};
use proofmark_service::{AnalysisService, ErrorDescriptor, ServiceError, ServiceResult};
use tokio::sync::oneshot;

use crate::host::{ChangeNotifier, HostEditor, SpanRequest};

/// A span the engine asked the host to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedSpan {
	pub doc: DocumentId,
	pub start: Position,
	pub end: Position,
	pub style: SpanStyle,
	pub tooltip: String,
}

#[derive(Debug)]
struct FakeDoc {
	kind: String,
	text: String,
	alive: bool,
}

#[derive(Debug, Default)]
struct HostState {
	docs: HashMap<DocumentId, FakeDoc>,
	active: Option<DocumentId>,
	spans: BTreeMap<RenderHandle, RecordedSpan>,
	next_handle: u64,
	cleared: usize,
	cleared_docs: Vec<(DocumentId, usize)>,
	subscriptions: HashMap<SubscriptionId, ChangeNotifier>,
	next_subscription: u64,
}

/// Scripted editor. Clones share state, so a test can keep one while the
/// engine (or a running driver) owns another.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeHost {
	state: Arc<Mutex<HostState>>,
}

impl FakeHost {
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens a document and makes it active.
	pub fn open(&self, doc: DocumentId, kind: &str, text: &str) {
		let mut state = self.state.lock();
		state.docs.insert(
			doc,
			FakeDoc {
				kind: kind.to_string(),
				text: text.to_string(),
				alive: true,
			},
		);
		state.active = Some(doc);
	}

	/// Replaces the text of `doc` and notifies its subscribers.
	pub fn edit(&self, doc: DocumentId, text: &str) {
		let notifiers: Vec<ChangeNotifier> = {
			let mut state = self.state.lock();
			if let Some(entry) = state.docs.get_mut(&doc) {
				entry.text = text.to_string();
			}
			state
				.subscriptions
				.values()
				.filter(|n| n.document() == doc)
				.cloned()
				.collect()
		};
		for notifier in notifiers {
			notifier.notify();
		}
	}

	/// Closes `doc`; it stays known but reports as no longer alive.
	pub fn close(&self, doc: DocumentId) {
		let mut state = self.state.lock();
		if let Some(entry) = state.docs.get_mut(&doc) {
			entry.alive = false;
		}
		if state.active == Some(doc) {
			state.active = None;
		}
	}

	pub fn spans_for(&self, doc: DocumentId) -> Vec<RecordedSpan> {
		self.state
			.lock()
			.spans
			.values()
			.filter(|span| span.doc == doc)
			.cloned()
			.collect()
	}

	pub fn span_count(&self) -> usize {
		self.state.lock().spans.len()
	}

	pub fn cleared_count(&self) -> usize {
		self.state.lock().cleared
	}

	/// Documents reported as cleared, with their span counts, in order.
	pub fn cleared_documents(&self) -> Vec<(DocumentId, usize)> {
		self.state.lock().cleared_docs.clone()
	}

	pub fn subscription_count(&self) -> usize {
		self.state.lock().subscriptions.len()
	}

	pub fn is_subscribed(&self, doc: DocumentId) -> bool {
		self.state
			.lock()
			.subscriptions
			.values()
			.any(|n| n.document() == doc)
	}
}

impl HostEditor for FakeHost {
	fn active_document(&self) -> Option<DocumentId> {
		self.state.lock().active
	}

	fn content_kind(&self, doc: DocumentId) -> Option<String> {
		self.state.lock().docs.get(&doc).map(|d| d.kind.clone())
	}

	fn text(&self, doc: DocumentId) -> Option<TextSnapshot> {
		self.state
			.lock()
			.docs
			.get(&doc)
			.map(|d| TextSnapshot::from(d.text.as_str()))
	}

	fn render_span(&mut self, doc: DocumentId, span: SpanRequest<'_>) -> RenderHandle {
		let mut state = self.state.lock();
		state.next_handle += 1;
		let handle = RenderHandle(state.next_handle);
		state.spans.insert(
			handle,
			RecordedSpan {
				doc,
				start: span.start,
				end: span.end,
				style: span.style,
				tooltip: span.tooltip.to_string(),
			},
		);
		handle
	}

	fn clear_span(&mut self, handle: RenderHandle) {
		let mut state = self.state.lock();
		assert!(state.spans.remove(&handle).is_some(), "cleared unknown span {handle:?}");
		state.cleared += 1;
	}

	fn document_cleared(&mut self, doc: DocumentId, count: usize) {
		assert!(count > 0);
		self.state.lock().cleared_docs.push((doc, count));
	}

	fn subscribe_text_changed(&mut self, doc: DocumentId, notifier: ChangeNotifier) -> SubscriptionId {
		assert_eq!(notifier.document(), doc);
		let mut state = self.state.lock();
		state.next_subscription += 1;
		let id = SubscriptionId(state.next_subscription);
		state.subscriptions.insert(id, notifier);
		id
	}

	fn unsubscribe(&mut self, subscription: SubscriptionId) {
		let removed = self.state.lock().subscriptions.remove(&subscription);
		assert!(removed.is_some(), "unknown subscription {subscription:?}");
	}

	fn is_alive(&self, doc: DocumentId) -> bool {
		self.state.lock().docs.get(&doc).is_some_and(|d| d.alive)
	}
}

type Reply = oneshot::Sender<ServiceResult<Vec<ErrorDescriptor>>>;

struct ScriptedCall {
	text: String,
	reply: Option<Reply>,
}

/// Analysis service whose answers are released by the test, in any order.
#[derive(Clone, Default)]
pub(crate) struct ScriptedService {
	calls: Arc<Mutex<Vec<ScriptedCall>>>,
}

impl ScriptedService {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn call_count(&self) -> usize {
		self.calls.lock().len()
	}

	/// Texts submitted so far, in submission order.
	pub fn texts(&self) -> Vec<String> {
		self.calls.lock().iter().map(|c| c.text.clone()).collect()
	}

	/// Answers the `index`-th request.
	pub fn respond(&self, index: usize, result: ServiceResult<Vec<ErrorDescriptor>>) {
		let reply = self.calls.lock()[index]
			.reply
			.take()
			.unwrap_or_else(|| panic!("request {index} already answered"));
		let _ = reply.send(result);
	}

	/// Yields until at least `count` requests have been submitted.
	pub async fn wait_for_calls(&self, count: usize) {
		for _ in 0..64 {
			if self.call_count() >= count {
				return;
			}
			tokio::task::yield_now().await;
		}
		panic!("expected {count} requests, saw {}", self.call_count());
	}
}

#[async_trait]
impl AnalysisService for ScriptedService {
	async fn check(&self, text: String) -> ServiceResult<Vec<ErrorDescriptor>> {
		let (tx, rx) = oneshot::channel();
		self.calls.lock().push(ScriptedCall { text, reply: Some(tx) });
		rx.await
			.unwrap_or_else(|_| Err(ServiceError::Network("scripted reply dropped".to_string())))
	}
}
