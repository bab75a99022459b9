use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(about = "Assemble a composite tree from contributed fragments")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Merge every bundle into the base tree and print the result
	Assemble {
		/// Assembly configuration file
		#[arg(value_name = "CONFIG")]
		config: PathBuf,

		/// Output format
		#[arg(long, short = 'f', value_enum, default_value_t = Format::Outline)]
		format: Format,
	},
	/// Print the order fragments are processed in
	///
	/// Shows the first-pass order only. Fragments whose parent is contributed later in the
	/// pass are retried by `assemble` after this order completes; those retries are not shown.
	Order {
		/// Assembly configuration file
		#[arg(value_name = "CONFIG")]
		config: PathBuf,
	},
}

/// Tree output formats.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
	/// Indented outline with contributor attribution
	#[default]
	Outline,
	/// The tree as JSON
	Json,
}
