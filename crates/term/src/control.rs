use std::io::BufRead;

use proofmark_engine::EngineHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::ControlCommand;

/// Applies commands read line by line from `input` until it ends, a `quit`
/// arrives, or the engine stops.
///
/// Runs on a dedicated thread so a blocked read never holds up shutdown.
pub fn read_commands(input: impl BufRead, handle: &EngineHandle, shutdown: &CancellationToken) {
	for line in input.lines() {
		let line = match line {
			Ok(line) => line,
			Err(error) => {
				warn!(%error, "control.read_failed");
				return;
			}
		};
		if line.trim().is_empty() {
			continue;
		}

		let Some(command) = ControlCommand::parse(&line) else {
			eprintln!("unknown command `{}` (toggle, on, off, quit)", line.trim());
			continue;
		};
		info!(?command, "control.command");

		let delivered = match command {
			ControlCommand::Toggle => handle.toggle(),
			ControlCommand::On => handle.set_enabled(true),
			ControlCommand::Off => handle.set_enabled(false),
			ControlCommand::Quit => {
				shutdown.cancel();
				return;
			}
		};
		if !delivered {
			return;
		}
	}
}
