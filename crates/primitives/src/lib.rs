//! Core types shared by the annotation engine, the analysis client, and hosts.

/// Annotation categories, spans, and render styling.
pub mod annotation;
/// Identifier types for documents and host-owned resources.
pub mod ids;
/// Offset encodings and character-offset to line/column mapping.
pub mod position;
/// Immutable text snapshots.
pub mod snapshot;

pub use annotation::{Annotation, Category, SpanStyle};
pub use ids::{DocumentId, RenderHandle, SubscriptionId};
pub use position::{OffsetEncoding, Position, char_to_position, encoded_len, offset_to_char};
pub use ropey::Rope;
pub use snapshot::TextSnapshot;
