//! CLI schema and stdin control commands for the proofmark binary.

use std::path::PathBuf;

use clap::Parser;


#[derive(Parser, Debug)]
#[command(name = "proofmark")]
#[command(about = "Live grammar and spelling annotations for markdown files")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Files to watch; `.md` and `.markdown` files are checked
	#[arg(required = true, value_name = "FILES")]
	pub files: Vec<PathBuf>,

	/// Configuration file (defaults to the platform config directory)
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Analysis service endpoint, overriding the configuration
	#[arg(long, value_name = "URL")]
	pub endpoint: Option<String>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

/// A command typed on stdin while the engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
	Toggle,
	On,
	Off,
	Quit,
}

impl ControlCommand {
	/// Parses one input line. Surrounding whitespace and case are ignored.
	pub fn parse(line: &str) -> Option<Self> {
		match line.trim().to_ascii_lowercase().as_str() {
			"toggle" | "t" => Some(Self::Toggle),
			"on" => Some(Self::On),
			"off" => Some(Self::Off),
			"quit" | "q" => Some(Self::Quit),
			_ => None,
		}
	}
}
