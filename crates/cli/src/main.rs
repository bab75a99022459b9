//! Trellis command-line front end.
//!
//! Loads an assembly configuration, folds every contribution bundle into the base tree and
//! prints the composite tree or the fragment processing order. Merge problems are logged and
//! never change the exit status; only configuration and loading errors do.

mod cli;
mod render;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use trellis_config::AssemblyConfig;
use trellis_merge::{Batch, Diagnostic, MergeSummary, Merger, ordering};
use trellis_model::{ContributorTable, Node};

use crate::cli::{Cli, Command, Format};
use crate::render::{OrderTable, Outline};

fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match cli.command {
		Command::Assemble { config, format } => {
			let assembled = assemble(&load_config(&config)?)?;
			match format {
				Format::Outline => print!(
					"{}",
					Outline {
						tree: &assembled.tree,
					}
				),
				Format::Json => println!("{}", serde_json::to_string_pretty(&assembled.tree)?),
			}
			eprintln!(
				"{}; {} diagnostics",
				assembled.summary,
				assembled.diagnostics.len()
			);
		}
		Command::Order { config } => {
			let batch = load_batch(&load_config(&config)?)?;
			for diagnostic in batch.diagnostics() {
				warn!("{diagnostic}");
			}
			let order = ordering::order(batch.fragments());
			print!(
				"{}",
				OrderTable {
					fragments: batch.fragments(),
					order: &order,
				}
			);
		}
	}
	Ok(())
}

/// Result of one assembly pass.
struct Assembled {
	tree: Node,
	contributors: ContributorTable,
	diagnostics: Vec<Diagnostic>,
	summary: MergeSummary,
}

fn load_config(path: &Path) -> Result<AssemblyConfig> {
	AssemblyConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

fn load_batch(config: &AssemblyConfig) -> Result<Batch> {
	let bundles = config.load_bundles().context("loading bundles")?;
	Ok(Batch::from_bundles(bundles))
}

fn assemble(config: &AssemblyConfig) -> Result<Assembled> {
	let mut tree = config
		.load_base()
		.with_context(|| format!("loading base tree {}", config.base.display()))?;
	let batch = load_batch(config)?;
	let schema = config.feature_schema();
	let mut contributors = ContributorTable::new();
	let mut diagnostics = Vec::new();

	let summary = Merger::new(&schema).with_options(config.merge).merge(
		batch,
		&mut tree,
		&mut contributors,
		&mut diagnostics,
	);

	Ok(Assembled {
		tree,
		contributors,
		diagnostics,
		summary,
	})
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("trellis_merge=debug,trellis_config=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
