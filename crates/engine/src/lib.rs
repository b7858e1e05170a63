//! Annotation synchronization engine.
//!
//! Keeps grammar and spelling annotations in a host editor consistent with a
//! remote analysis service while the user types:
//!
//! - the active document is discovered by polling ([`poller`])
//! - edits are debounced into one check per quiet period ([`debounce`])
//! - each check is tagged so answers that arrive late or out of order are
//!   discarded ([`coordinator`])
//! - accepted answers replace the document's rendered spans ([`store`])
//!
//! [`Engine`] holds all of this state and [`EngineDriver`] runs it on a single
//! task. Hosts implement [`HostEditor`]; toggling goes through
//! [`EngineHandle`].

pub mod annotation;
pub mod coordinator;
pub mod debounce;
pub mod driver;
pub mod engine;
pub mod event;
pub mod host;
pub mod options;
pub mod poller;
pub mod store;

#[cfg(test)]
mod test_support;

pub use annotation::{MalformedDescriptor, annotation_from_descriptor, annotations_from_descriptors};
pub use coordinator::{CoordinatorState, RequestCoordinator};
pub use debounce::{DebouncedTrigger, Debouncer, TriggerSet};
pub use driver::{EngineDriver, EngineHandle};
pub use engine::{CompletionOutcome, Engine};
pub use event::{CheckCompletion, CheckTicket, EngineEvent};
pub use host::{ChangeNotifier, HostEditor, SpanRequest};
pub use options::EngineOptions;
pub use poller::{ActiveDocumentPoller, PollDecision, PollOutcome};
pub use store::{AnnotationStore, RenderedAnnotation};
