//! File-backed host editor.
//!
//! Every file named on the command line is one document. The active document
//! is the most recently modified live file. Rendered spans are printed to
//! stdout as `path:line:col-line:col class (message)` with 1-based
//! positions. When a document's spans are released, `path cleared N` is
//! printed.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use parking_lot::Mutex;
use proofmark_config::MARKDOWN_KIND;
use proofmark_engine::{ChangeNotifier, HostEditor, SpanRequest};
use proofmark_primitives::{DocumentId, RenderHandle, SubscriptionId, TextSnapshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How often watched files are re-read.
pub const WATCH_PERIOD: Duration = Duration::from_millis(250);

#[derive(Debug)]
struct WatchedFile {
	id: DocumentId,
	path: PathBuf,
	kind: Option<String>,
	text: String,
	modified: Option<SystemTime>,
	len: u64,
	alive: bool,
}

#[derive(Debug, Default)]
struct FileHostState {
	files: Vec<WatchedFile>,
	spans: BTreeMap<RenderHandle, String>,
	next_handle: u64,
	subscriptions: HashMap<SubscriptionId, ChangeNotifier>,
	next_subscription: u64,
}

impl FileHostState {
	fn file(&self, doc: DocumentId) -> Option<&WatchedFile> {
		self.files.iter().find(|f| f.id == doc)
	}

	fn path(&self, doc: DocumentId) -> PathBuf {
		self.file(doc)
			.map(|f| f.path.clone())
			.unwrap_or_else(|| PathBuf::from(doc.to_string()))
	}
}

fn emit(line: &str) {
	let mut out = std::io::stdout().lock();
	if let Err(error) = writeln!(out, "{line}") {
		warn!(%error, "host.render.write_failed");
	}
}

/// Host over a fixed set of files. Clones share state with the watcher.
#[derive(Debug, Clone, Default)]
pub struct FileHost {
	state: Arc<Mutex<FileHostState>>,
}

impl FileHost {
	/// Reads every file in `paths`. Document ids follow argument order.
	pub fn open(paths: &[PathBuf]) -> anyhow::Result<Self> {
		let mut files = Vec::with_capacity(paths.len());
		for (index, path) in paths.iter().enumerate() {
			let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
			let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
			files.push(WatchedFile {
				id: DocumentId(index as u64 + 1),
				path: path.clone(),
				kind: content_kind_for(path),
				len: text.len() as u64,
				text,
				modified,
				alive: true,
			});
		}

		Ok(Self {
			state: Arc::new(Mutex::new(FileHostState {
				files,
				..FileHostState::default()
			})),
		})
	}

	pub fn rendered_count(&self) -> usize {
		self.state.lock().spans.len()
	}

	/// Re-reads files whose metadata changed and notifies subscribers of
	/// documents whose text differs. Files that can no longer be read are
	/// marked dead. Returns the documents that changed.
	pub fn refresh(&self) -> Vec<DocumentId> {
		let (changed, notifiers) = {
			let mut state = self.state.lock();
			let mut changed = Vec::new();
			for file in state.files.iter_mut().filter(|f| f.alive) {
				let (modified, len) = match std::fs::metadata(&file.path) {
					Ok(meta) => (meta.modified().ok(), meta.len()),
					Err(error) => {
						debug!(path = %file.path.display(), %error, "host.file.gone");
						file.alive = false;
						continue;
					}
				};
				if modified.is_some() && modified == file.modified && len == file.len {
					continue;
				}
				file.modified = modified;
				file.len = len;

				match std::fs::read_to_string(&file.path) {
					Ok(text) if text != file.text => {
						file.text = text;
						changed.push(file.id);
					}
					Ok(_) => {}
					Err(error) => {
						warn!(path = %file.path.display(), %error, "host.file.unreadable");
						file.alive = false;
					}
				}
			}

			let notifiers: Vec<ChangeNotifier> = state
				.subscriptions
				.values()
				.filter(|n| changed.contains(&n.document()))
				.cloned()
				.collect();
			(changed, notifiers)
		};

		for notifier in notifiers {
			notifier.notify();
		}
		changed
	}
}

impl HostEditor for FileHost {
	fn active_document(&self) -> Option<DocumentId> {
		let state = self.state.lock();
		most_recent(state.files.iter().filter(|f| f.alive).map(|f| (f.id, f.modified)))
	}

	fn content_kind(&self, doc: DocumentId) -> Option<String> {
		self.state.lock().file(doc).and_then(|f| f.kind.clone())
	}

	fn text(&self, doc: DocumentId) -> Option<TextSnapshot> {
		self.state
			.lock()
			.file(doc)
			.map(|f| TextSnapshot::from(f.text.as_str()))
	}

	fn render_span(&mut self, doc: DocumentId, span: SpanRequest<'_>) -> RenderHandle {
		let mut state = self.state.lock();
		let line = format_span(&state.path(doc), &span);
		emit(&line);

		state.next_handle += 1;
		let handle = RenderHandle(state.next_handle);
		state.spans.insert(handle, line);
		handle
	}

	fn clear_span(&mut self, handle: RenderHandle) {
		if let Some(line) = self.state.lock().spans.remove(&handle) {
			debug!(span = %line, "host.render.cleared");
		}
	}

	fn document_cleared(&mut self, doc: DocumentId, count: usize) {
		let path = self.state.lock().path(doc);
		emit(&format_cleared(&path, count));
	}

	fn subscribe_text_changed(&mut self, doc: DocumentId, notifier: ChangeNotifier) -> SubscriptionId {
		let mut state = self.state.lock();
		state.next_subscription += 1;
		let id = SubscriptionId(state.next_subscription);
		state.subscriptions.insert(id, notifier);
		debug!(%doc, subscription = id.0, "host.subscribe");
		id
	}

	fn unsubscribe(&mut self, subscription: SubscriptionId) {
		self.state.lock().subscriptions.remove(&subscription);
	}

	fn is_alive(&self, doc: DocumentId) -> bool {
		self.state.lock().file(doc).is_some_and(|f| f.alive)
	}
}

/// Polls watched files until `shutdown` is cancelled.
pub async fn watch(host: FileHost, period: Duration, shutdown: CancellationToken) {
	let mut ticker = tokio::time::interval(period);
	ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
	loop {
		tokio::select! {
			_ = shutdown.cancelled() => break,
			_ = ticker.tick() => {
				let changed = host.refresh();
				if !changed.is_empty() {
					debug!(?changed, "host.watch.changed");
				}
			}
		}
	}
}

/// Content kind from the file extension.
pub fn content_kind_for(path: &Path) -> Option<String> {
	let ext = path.extension()?.to_str()?.to_ascii_lowercase();
	match ext.as_str() {
		"md" | "markdown" => Some(MARKDOWN_KIND.to_string()),
		_ => Some(ext),
	}
}

/// Picks the most recently modified document. Unknown times rank lowest and
/// ties go to the later argument.
pub fn most_recent(files: impl Iterator<Item = (DocumentId, Option<SystemTime>)>) -> Option<DocumentId> {
	files
		.max_by(|(a_id, a), (b_id, b)| a.cmp(b).then(a_id.cmp(b_id)))
		.map(|(id, _)| id)
}

pub fn format_span(path: &Path, span: &SpanRequest<'_>) -> String {
	format!(
		"{}:{}:{}-{}:{} {} {}",
		path.display(),
		span.start.line + 1,
		span.start.column + 1,
		span.end.line + 1,
		span.end.column + 1,
		span.style.class_name(),
		span.tooltip,
	)
}

pub fn format_cleared(path: &Path, count: usize) -> String {
	format!("{} cleared {count}", path.display())
}
