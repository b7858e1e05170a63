//! Event loop that runs an [`Engine`].
//!
//! The driver owns the engine and multiplexes everything that can change its
//! state onto one task: poll ticks, change notifications, debounce
//! deadlines, request completions, toggle commands, and shutdown. Nothing
//! touches the engine concurrently.

use std::sync::Arc;
use std::time::Duration;

use proofmark_service::AnalysisService;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::engine::Engine;
use crate::event::EngineEvent;
use crate::host::HostEditor;
use crate::options::EngineOptions;
use crate::poller::poll_interval;


/// Toggle control for a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
	tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineHandle {
	/// Requests checking on or off. Returns `false` if the driver has stopped.
	pub fn set_enabled(&self, enabled: bool) -> bool {
		self.tx.send(EngineEvent::SetEnabled(enabled)).is_ok()
	}

	/// Requests a flip of the checking state. Returns `false` if the driver
	/// has stopped.
	pub fn toggle(&self) -> bool {
		self.tx.send(EngineEvent::Toggle).is_ok()
	}
}

pub struct EngineDriver<H> {
	engine: Engine<H>,
	events: mpsc::UnboundedReceiver<EngineEvent>,
	refresh: Duration,
}

impl<H> std::fmt::Debug for EngineDriver<H> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EngineDriver")
			.field("engine", &self.engine)
			.field("refresh", &self.refresh)
			.finish()
	}
}

impl<H: HostEditor> EngineDriver<H> {
	pub fn new(host: H, service: Arc<dyn AnalysisService>, options: EngineOptions) -> (Self, EngineHandle) {
		let (tx, events) = mpsc::unbounded_channel();
		let refresh = options.refresh;
		let engine = Engine::new(host, service, options, tx.clone());
		(
			Self {
				engine,
				events,
				refresh,
			},
			EngineHandle { tx },
		)
	}

	pub fn engine(&self) -> &Engine<H> {
		&self.engine
	}

	/// Runs until `shutdown` is cancelled, then releases everything the engine
	/// rendered and hands the host back.
	pub async fn run(mut self, shutdown: CancellationToken) -> H {
		let mut ticker = poll_interval(self.refresh);
		info!(
			refresh_ms = self.refresh.as_millis() as u64,
			enabled = self.engine.is_enabled(),
			"engine.driver.start"
		);

		loop {
			let deadline = self.engine.next_deadline();
			tokio::select! {
				biased;
				_ = shutdown.cancelled() => break,
				event = self.events.recv() => {
					let Some(event) = event else {
						debug!("engine.driver.channel_closed");
						break;
					};
					self.engine.handle_event(event, Instant::now());
				}
				_ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
					self.engine.fire_due(Instant::now());
				}
				_ = ticker.tick() => {
					self.engine.poll_tick();
				}
			}
		}

		self.engine.shutdown();
		info!("engine.driver.stop");
		self.engine.into_host()
	}
}
