use std::fmt;

use ropey::Rope;

/// Text of a document captured at one instant.
///
/// Snapshots are never mutated after construction. Cloning shares the
/// underlying rope storage, so snapshots are cheap to hand to in-flight
/// requests and to keep alongside per-document state.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TextSnapshot {
	rope: Rope,
}

impl TextSnapshot {
	pub fn new(rope: Rope) -> Self {
		Self { rope }
	}

	/// Read-only view of the captured text.
	pub fn rope(&self) -> &Rope {
		&self.rope
	}

	/// Number of Unicode scalar values in the snapshot.
	pub fn len_chars(&self) -> usize {
		self.rope.len_chars()
	}

	pub fn is_empty(&self) -> bool {
		self.rope.len_chars() == 0
	}
}

impl From<&str> for TextSnapshot {
	fn from(text: &str) -> Self {
		Self::new(Rope::from_str(text))
	}
}

impl From<String> for TextSnapshot {
	fn from(text: String) -> Self {
		Self::new(Rope::from(text))
	}
}

impl fmt::Display for TextSnapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for chunk in self.rope.chunks() {
			f.write_str(chunk)?;
		}
		Ok(())
	}
}

impl fmt::Debug for TextSnapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TextSnapshot")
			.field("chars", &self.rope.len_chars())
			.field("lines", &self.rope.len_lines())
			.finish()
	}
}
