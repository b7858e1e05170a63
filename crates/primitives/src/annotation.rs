use std::fmt;

/// Kind of problem an annotation marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	Grammar,
	Spelling,
}

impl Category {
	/// Classifies a service message.
	///
	/// The service does not report a category of its own; spelling findings
	/// are recognised by the word "spelling" appearing in the message.
	pub fn classify(message: &str) -> Self {
		if message.contains("spelling") {
			Self::Spelling
		} else {
			Self::Grammar
		}
	}

	pub fn style(self) -> SpanStyle {
		match self {
			Self::Grammar => SpanStyle::GrammarError,
			Self::Spelling => SpanStyle::SpellingError,
		}
	}
}

/// Visual style the host applies to a rendered span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanStyle {
	GrammarError,
	SpellingError,
}

impl SpanStyle {
	/// Class name hosts can map onto their own theming.
	pub fn class_name(self) -> &'static str {
		match self {
			Self::GrammarError => "grammar-error",
			Self::SpellingError => "spelling-error",
		}
	}
}

impl fmt::Display for SpanStyle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.class_name())
	}
}

/// One finding, expressed as a character range in the snapshot it was
/// computed against.
///
/// `start < end` and both lie inside that snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
	pub start: usize,
	pub end: usize,
	pub category: Category,
	pub message: String,
}

impl Annotation {
	/// Tooltip text shown next to the span.
	pub fn tooltip(&self) -> String {
		format!("({})", self.message)
	}

	pub fn style(&self) -> SpanStyle {
		self.category.style()
	}

}
