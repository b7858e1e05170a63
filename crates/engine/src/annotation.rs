//! Conversion of service error descriptors into annotations.

use proofmark_primitives::{
	Annotation, Category, DocumentId, OffsetEncoding, TextSnapshot, encoded_len, offset_to_char,
};
use proofmark_service::ErrorDescriptor;
use thiserror::Error;
use tracing::warn;

/// Why a descriptor could not be turned into an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedDescriptor {
	#[error("negative offset {offset}")]
	NegativeOffset { offset: i64 },
	#[error("span length {length} is not positive")]
	EmptySpan { length: i64 },
	#[error("span {offset}+{length} exceeds text of {len} {encoding} units")]
	OutOfBounds {
		offset: i64,
		length: i64,
		len: usize,
		encoding: &'static str,
	},
	#[error("offset {offset} splits a character")]
	SplitsCharacter { offset: usize },
}

/// Builds the annotation for one descriptor against the snapshot it was
/// computed from.
///
/// The end offset is `offset + errorLength`; both ends are converted from
/// `encoding` units to character indices.
pub fn annotation_from_descriptor(
	descriptor: &ErrorDescriptor,
	snapshot: &TextSnapshot,
	encoding: OffsetEncoding,
) -> Result<Annotation, MalformedDescriptor> {
	let ErrorDescriptor {
		offset,
		error_length: length,
		ref message,
	} = *descriptor;

	if offset < 0 {
		return Err(MalformedDescriptor::NegativeOffset { offset });
	}
	if length <= 0 {
		return Err(MalformedDescriptor::EmptySpan { length });
	}

	let text = snapshot.rope();
	let len = encoded_len(text, encoding);
	let out_of_bounds = || MalformedDescriptor::OutOfBounds {
		offset,
		length,
		len,
		encoding: encoding.as_str(),
	};

	let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
	let end = offset
		.checked_add(length)
		.and_then(|end| usize::try_from(end).ok())
		.ok_or_else(out_of_bounds)?;
	if end > len {
		return Err(out_of_bounds());
	}

	let start_char = offset_to_char(text, start, encoding)
		.ok_or(MalformedDescriptor::SplitsCharacter { offset: start })?;
	let end_char =
		offset_to_char(text, end, encoding).ok_or(MalformedDescriptor::SplitsCharacter { offset: end })?;

	Ok(Annotation {
		start: start_char,
		end: end_char,
		category: Category::classify(message),
		message: message.clone(),
	})
}

/// Converts a whole response, dropping (and logging) malformed entries.
pub fn annotations_from_descriptors(
	doc: DocumentId,
	descriptors: &[ErrorDescriptor],
	snapshot: &TextSnapshot,
	encoding: OffsetEncoding,
) -> Vec<Annotation> {
	descriptors
		.iter()
		.filter_map(|descriptor| match annotation_from_descriptor(descriptor, snapshot, encoding) {
			Ok(annotation) => Some(annotation),
			Err(error) => {
				warn!(%doc, %error, message = %descriptor.message, "engine.annotation.malformed");
				None
			}
		})
		.collect()
}
