use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` raises the default level.
/// When `PROOFMARK_LOG_DIR` names a usable directory, logs go to a per-process
/// file there instead of stderr, keeping stdout free for rendered spans.
pub fn setup_tracing(verbose: bool) {
	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
	};

	if let Some(log_dir) = std::env::var("PROOFMARK_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("proofmark.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry()
				.with(filter())
				.with(file_layer)
				.init();

			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}

fn default_directives(verbose: bool) -> &'static str {
	if verbose {
		"proofmark_engine=trace,proofmark_service=debug,proofmark=debug,info"
	} else {
		"warn,proofmark_engine=info,proofmark=info"
	}
}
