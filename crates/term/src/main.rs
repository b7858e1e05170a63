//! proofmark: live grammar and spelling annotations for markdown files.
//!
//! Watches the given files, checks the most recently modified markdown file
//! against the analysis service, and prints findings as they change. Type
//! `toggle`, `on`, `off` or `quit` on stdin to control checking.

mod cli;
mod control;
mod host;
mod logging;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use host::{FileHost, WATCH_PERIOD};
use proofmark_config::Config;
use proofmark_engine::{EngineDriver, EngineOptions};
use proofmark_service::HttpAnalysisClient;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	logging::setup_tracing(cli.verbose);

	let mut config = load_config(cli.config.as_deref())?;
	if let Some(endpoint) = cli.endpoint.clone() {
		config.service.endpoint = endpoint;
		config.validate().context("invalid --endpoint")?;
	}

	let client = HttpAnalysisClient::new(&config.service.endpoint, config.request_timeout())
		.context("failed to create analysis client")?;
	let host = FileHost::open(&cli.files)?;

	info!(
		endpoint = %client.endpoint(),
		files = cli.files.len(),
		enabled = config.enabled,
		"proofmark.start"
	);

	let (driver, handle) = EngineDriver::new(host.clone(), Arc::new(client), EngineOptions::from(&config));
	let shutdown = CancellationToken::new();

	let watcher = tokio::spawn(host::watch(host.clone(), WATCH_PERIOD, shutdown.clone()));

	{
		let shutdown = shutdown.clone();
		tokio::spawn(async move {
			match tokio::signal::ctrl_c().await {
				Ok(()) => shutdown.cancel(),
				Err(error) => warn!(%error, "proofmark.signal_unavailable"),
			}
		});
	}

	{
		let shutdown = shutdown.clone();
		std::thread::Builder::new()
			.name("proofmark-stdin".to_string())
			.spawn(move || control::read_commands(std::io::stdin().lock(), &handle, &shutdown))
			.context("failed to spawn stdin reader")?;
	}

	driver.run(shutdown.clone()).await;
	shutdown.cancel();
	if let Err(error) = watcher.await {
		warn!(%error, "proofmark.watcher_failed");
	}

	info!(remaining = host.rendered_count(), "proofmark.stop");
	Ok(())
}

/// Loads the configuration file. A path given on the command line must exist
/// and parse; the default file falls back to defaults when it is missing or
/// broken.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
	if let Some(path) = explicit {
		return Config::load(path).with_context(|| format!("failed to load {}", path.display()));
	}
	let Some(path) = Config::default_path() else {
		return Ok(Config::default());
	};
	match Config::load_or_default(&path) {
		Ok(config) => Ok(config),
		Err(err) => {
			error!(path = %path.display(), error = %err, "failed to load settings, using defaults");
			Ok(Config::default())
		}
	}
}
