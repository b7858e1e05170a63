//! Mapping from service offsets to renderable positions.
//!
//! Analysis services report spans as flat offsets into the submitted text.
//! Depending on the service implementation those offsets count UTF-8 bytes,
//! UTF-16 code units, or Unicode scalar values. [`offset_to_char`] normalises
//! them to rope character indices; [`char_to_position`] then yields the
//! zero-based line/column pair hosts draw with.
//!
//! Both functions are pure and return `None` for offsets that do not land on
//! a character boundary inside the snapshot.

use ropey::Rope;
use serde::{Deserialize, Serialize};

/// Unit in which a service counts offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetEncoding {
	/// UTF-8 byte offsets.
	Utf8,
	/// UTF-16 code unit offsets (what a browser-hosted service produces).
	Utf16,
	/// Unicode scalar value offsets.
	#[default]
	Utf32,
}

impl OffsetEncoding {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Utf8 => "utf8",
			Self::Utf16 => "utf16",
			Self::Utf32 => "utf32",
		}
	}
}

/// Zero-based line and character column inside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
	pub line: usize,
	pub column: usize,
}

impl Position {
	pub const fn new(line: usize, column: usize) -> Self {
		Self { line, column }
	}
}

/// Converts an offset counted in `encoding` into a rope character index.
///
/// The end of the text is a valid offset. Offsets past the end, or that
/// split a multi-unit character, yield `None`.
pub fn offset_to_char(text: &Rope, offset: usize, encoding: OffsetEncoding) -> Option<usize> {
	match encoding {
		OffsetEncoding::Utf32 => (offset <= text.len_chars()).then_some(offset),
		OffsetEncoding::Utf16 => {
			let char_idx = text.try_utf16_cu_to_char(offset).ok()?;
			(text.char_to_utf16_cu(char_idx) == offset).then_some(char_idx)
		}
		OffsetEncoding::Utf8 => {
			let char_idx = text.try_byte_to_char(offset).ok()?;
			(text.char_to_byte(char_idx) == offset).then_some(char_idx)
		}
	}
}

/// Length of `text` counted in `encoding` units.
pub fn encoded_len(text: &Rope, encoding: OffsetEncoding) -> usize {
	match encoding {
		OffsetEncoding::Utf8 => text.len_bytes(),
		OffsetEncoding::Utf16 => text.len_utf16_cu(),
		OffsetEncoding::Utf32 => text.len_chars(),
	}
}

/// Maps a character index to its line/column position.
pub fn char_to_position(text: &Rope, char_idx: usize) -> Option<Position> {
	let line = text.try_char_to_line(char_idx).ok()?;
	let column = char_idx - text.line_to_char(line);
	Some(Position { line, column })
}
