//! Events multiplexed onto the engine's event loop.

use proofmark_primitives::DocumentId;
use proofmark_service::{ErrorDescriptor, ServiceResult};

/// Tag attached to every in-flight analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTicket {
	pub doc: DocumentId,
	/// Generation the request was issued under.
	pub generation: u64,
	/// Engine epoch at issue time; bumped on every disable.
	pub epoch: u64,
}

/// Result of an analysis request, delivered back to the event loop.
#[derive(Debug)]
pub struct CheckCompletion {
	pub ticket: CheckTicket,
	pub result: ServiceResult<Vec<ErrorDescriptor>>,
}

pub enum EngineEvent {
	/// The host reported an edit to a subscribed document.
	TextChanged(DocumentId),
	/// An analysis request finished (successfully or not).
	CheckCompleted(CheckCompletion),
	/// Toggle control forced checking on or off.
	SetEnabled(bool),
	/// Toggle control flipped checking.
	Toggle,
}

impl std::fmt::Debug for EngineEvent {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::TextChanged(doc) => f.debug_tuple("TextChanged").field(doc).finish(),
			Self::CheckCompleted(completion) => f
				.debug_struct("CheckCompleted")
				.field("ticket", &completion.ticket)
				.field("ok", &completion.result.is_ok())
				.finish(),
			Self::SetEnabled(enabled) => f.debug_tuple("SetEnabled").field(enabled).finish(),
			Self::Toggle => f.write_str("Toggle"),
		}
	}
}
