//! Rendered annotation bookkeeping.
//!
//! [`AnnotationStore`] owns every render handle the engine has obtained from
//! the host. The handles held for a document always correspond to the most
//! recently accepted analysis of that document: replacing releases the old
//! set before drawing the new one, and disabling releases everything.

use std::collections::HashMap;

use proofmark_primitives::{Annotation, DocumentId, RenderHandle, TextSnapshot};
use tracing::{debug, warn};

use crate::host::{HostEditor, SpanRequest};

/// An annotation together with the host handle that draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAnnotation {
	pub annotation: Annotation,
	pub handle: RenderHandle,
}

#[derive(Debug, Default)]
pub struct AnnotationStore {
	docs: HashMap<DocumentId, Vec<RenderedAnnotation>>,
}

impl AnnotationStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces everything drawn for `doc` with `annotations`.
	///
	/// Positions are computed against `snapshot`, which must be the text the
	/// annotations were derived from. Annotations the host cannot position
	/// are skipped. Returns the number of spans drawn.
	pub fn replace<H: HostEditor + ?Sized>(
		&mut self,
		host: &mut H,
		doc: DocumentId,
		annotations: Vec<Annotation>,
		snapshot: &TextSnapshot,
	) -> usize {
		let released = self.clear_document(host, doc);

		let mut rendered = Vec::with_capacity(annotations.len());
		for annotation in annotations {
			let (Some(start), Some(end)) = (
				host.offset_to_position(snapshot, annotation.start),
				host.offset_to_position(snapshot, annotation.end),
			) else {
				warn!(
					%doc,
					start = annotation.start,
					end = annotation.end,
					"engine.store.unmappable"
				);
				continue;
			};

			let tooltip = annotation.tooltip();
			let handle = host.render_span(
				doc,
				SpanRequest {
					start,
					end,
					style: annotation.style(),
					tooltip: &tooltip,
				},
			);
			rendered.push(RenderedAnnotation { annotation, handle });
		}

		let count = rendered.len();
		debug!(%doc, released, rendered = count, "engine.store.replace");
		if !rendered.is_empty() {
			self.docs.insert(doc, rendered);
		}
		count
	}

	/// Releases every span drawn for `doc`. Returns how many were released.
	pub fn clear_document<H: HostEditor + ?Sized>(&mut self, host: &mut H, doc: DocumentId) -> usize {
		let Some(previous) = self.docs.remove(&doc) else {
			return 0;
		};
		let count = previous.len();
		for rendered in previous {
			host.clear_span(rendered.handle);
		}
		host.document_cleared(doc, count);
		count
	}

	/// Releases every span for every document.
	pub fn clear_all<H: HostEditor + ?Sized>(&mut self, host: &mut H) -> usize {
		let mut count = 0;
		let mut docs: Vec<_> = self.docs.drain().collect();
		docs.sort_unstable_by_key(|(doc, _)| *doc);
		for (doc, rendered) in docs {
			count += rendered.len();
			for entry in &rendered {
				host.clear_span(entry.handle);
			}
			host.document_cleared(doc, rendered.len());
		}
		count
	}

	/// Spans currently drawn for `doc`.
	pub fn rendered(&self, doc: DocumentId) -> &[RenderedAnnotation] {
		self.docs.get(&doc).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Total number of spans held across all documents.
	pub fn total(&self) -> usize {
		self.docs.values().map(Vec::len).sum()
	}
}
