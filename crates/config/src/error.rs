//! Error types for configuration and fragment-source loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading an assembly.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a file or directory.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error decoding a TOML document.
	#[error("TOML parse error in {path}: {error}")]
	Toml {
		path: PathBuf,
		#[source]
		error: toml::de::Error,
	},

	/// Error decoding a JSON tree.
	#[error("JSON parse error in {path}: {error}")]
	Json {
		path: PathBuf,
		#[source]
		error: serde_json::Error,
	},

	/// The file extension names no supported format.
	#[error("unsupported tree format: {0} (expected .toml or .json)")]
	UnsupportedFormat(PathBuf),
}

impl ConfigError {
	pub(crate) fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			error,
		}
	}
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
