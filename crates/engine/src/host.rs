//! Boundary to the host editor environment.
//!
//! The engine never inspects concrete editor objects. Everything it needs
//! from the editor goes through [`HostEditor`]: which document is active,
//! its text and content kind, drawing and releasing spans, and text-changed
//! subscriptions.

use proofmark_primitives::{
	DocumentId, Position, RenderHandle, SpanStyle, SubscriptionId, TextSnapshot, char_to_position,
};
use tokio::sync::mpsc;

use crate::event::EngineEvent;

/// A span the host is asked to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanRequest<'a> {
	/// Start position (inclusive).
	pub start: Position,
	/// End position (exclusive).
	pub end: Position,
	pub style: SpanStyle,
	pub tooltip: &'a str,
}

/// Editor operations the engine relies on.
///
/// All methods are called from the engine's single execution context.
pub trait HostEditor {
	/// The document the user is currently editing, if any.
	fn active_document(&self) -> Option<DocumentId>;

	/// Content kind of `doc` (for example `"markdown"`).
	fn content_kind(&self, doc: DocumentId) -> Option<String>;

	/// Full text of `doc` as it stands right now.
	fn text(&self, doc: DocumentId) -> Option<TextSnapshot>;

	/// Converts a character index in `snapshot` to a renderable position.
	fn offset_to_position(&self, snapshot: &TextSnapshot, offset: usize) -> Option<Position> {
		char_to_position(snapshot.rope(), offset)
	}

	/// Draws a highlighted span and returns the handle that releases it.
	fn render_span(&mut self, doc: DocumentId, span: SpanRequest<'_>) -> RenderHandle;

	/// Releases a span previously returned by [`render_span`](Self::render_span).
	fn clear_span(&mut self, handle: RenderHandle);

	/// Called after every span drawn for `doc` was released, with the number
	/// released. Never called with zero.
	fn document_cleared(&mut self, doc: DocumentId, count: usize) {
		let _ = (doc, count);
	}

	/// Starts delivering text-changed notifications for `doc` to `notifier`.
	fn subscribe_text_changed(&mut self, doc: DocumentId, notifier: ChangeNotifier) -> SubscriptionId;

	/// Stops a subscription created by
	/// [`subscribe_text_changed`](Self::subscribe_text_changed).
	fn unsubscribe(&mut self, subscription: SubscriptionId);

	/// Whether `doc` still exists in the editor.
	///
	/// Hosts that cannot tell keep the default, in which case tracked
	/// documents are only released by disabling the engine.
	fn is_alive(&self, doc: DocumentId) -> bool {
		let _ = doc;
		true
	}
}

/// Callback handed to the host on subscription.
///
/// Cheap to clone and safe to move to other threads; notifications are
/// queued onto the engine's event loop.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
	doc: DocumentId,
	tx: mpsc::UnboundedSender<EngineEvent>,
}

impl ChangeNotifier {
	pub(crate) fn new(doc: DocumentId, tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
		Self { doc, tx }
	}

	pub fn document(&self) -> DocumentId {
		self.doc
	}

	/// Reports that the document's text changed.
	///
	/// Returns `false` once the engine has shut down.
	pub fn notify(&self) -> bool {
		self.tx.send(EngineEvent::TextChanged(self.doc)).is_ok()
	}
}
