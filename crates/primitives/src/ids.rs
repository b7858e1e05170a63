use std::fmt;

/// Identity of one editable text buffer, assigned by the host.
///
/// Stable for the buffer's lifetime and never shared between two live
/// buffers, so it is safe to use as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "doc#{}", self.0)
	}
}

/// Opaque handle to a span drawn by the host.
///
/// Must be handed back to the host to release the visual artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u64);

/// Opaque handle to a host text-changed subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);
