//! Assembly configuration for trellis.
//!
//! An assembly run is described by a TOML file naming the base tree, the contribution bundles
//! to fold into it, merge options and an optional feature schema:
//!
//! ```toml
//! base = "app.toml"
//! bundles = ["plugins", "extra/editor.toml"]
//!
//! [merge]
//! defer_unresolved_parents = true
//! record_contributors = true
//!
//! [schema.toolbar]
//! features = ["children"]
//! ```
//!
//! Relative paths resolve against the directory of the configuration file. A bundle entry
//! naming a directory loads every `*.toml` file directly inside it, sorted by file name, so
//! discovery order is the same on every run.
//!
//! # Trees
//!
//! Base trees are TOML or JSON, chosen by extension. Nodes carry an optional `id` and `kind`
//! and a `features` table of child lists:
//!
//! ```toml
//! id = "app"
//!
//! [[features.children]]
//! id = "toolbar"
//! kind = "toolbar"
//! ```
//!
//! # Bundles
//!
//! ```toml
//! id = "editor"
//! requires = ["core"]
//!
//! [[fragments]]
//! parent = "toolbar"
//! feature = "children"
//! position = "after:open"
//! check_exists = true
//!
//! [[fragments.elements]]
//! id = "save"
//! ```
//!
//! A bundle without a `uri` is identified by the path it was loaded from.

pub mod error;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use trellis_merge::{Bundle, MergeOptions};
use trellis_model::{FeatureSchema, Node};

pub use error::{ConfigError, Result};

/// Parsed assembly configuration with paths resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyConfig {
	/// Base tree file.
	pub base: PathBuf,
	/// Bundle files and directories, in discovery order.
	pub bundles: Vec<PathBuf>,
	pub merge: MergeOptions,
	/// Supported features per node kind. Empty means every node supports every feature.
	pub schema: IndexMap<String, KindSchema>,
}

/// Features one node kind supports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KindSchema {
	#[serde(default)]
	pub features: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
	base: PathBuf,
	#[serde(default)]
	bundles: Vec<PathBuf>,
	#[serde(default)]
	merge: MergeOptions,
	#[serde(default)]
	schema: IndexMap<String, KindSchema>,
}

impl AssemblyConfig {
	/// Parses configuration text read from `origin`.
	///
	/// `origin` names the file in errors, and its directory anchors relative paths.
	pub fn parse(input: &str, origin: &Path) -> Result<Self> {
		let raw: RawConfig = parse_toml(input, origin)?;
		let dir = origin.parent().unwrap_or_else(|| Path::new(""));
		Ok(Self {
			base: dir.join(raw.base),
			bundles: raw.bundles.into_iter().map(|p| dir.join(p)).collect(),
			merge: raw.merge,
			schema: raw.schema,
		})
	}

	/// Loads configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = read(path)?;
		Self::parse(&content, path)
	}

	/// Builds the feature schema declared by the `[schema]` tables.
	pub fn feature_schema(&self) -> FeatureSchema {
		let mut schema = FeatureSchema::open();
		for (kind, entry) in &self.schema {
			schema.declare(kind.as_str(), entry.features.iter().map(String::as_str));
		}
		schema
	}

	/// Loads the base tree.
	pub fn load_base(&self) -> Result<Node> {
		load_tree(&self.base)
	}

	/// Loads every configured bundle in discovery order.
	pub fn load_bundles(&self) -> Result<Vec<Bundle>> {
		load_bundles(&self.bundles)
	}
}

/// Loads a tree from a `.toml` or `.json` file.
pub fn load_tree(path: impl AsRef<Path>) -> Result<Node> {
	let path = path.as_ref();
	match path.extension().and_then(|ext| ext.to_str()) {
		Some("toml") => parse_toml(&read(path)?, path),
		Some("json") => serde_json::from_str(&read(path)?).map_err(|error| ConfigError::Json {
			path: path.to_path_buf(),
			error,
		}),
		_ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
	}
}

/// Loads one bundle file.
pub fn load_bundle(path: impl AsRef<Path>) -> Result<Bundle> {
	let path = path.as_ref();
	let mut bundle: Bundle = parse_toml(&read(path)?, path)?;
	if bundle.uri.is_empty() {
		bundle.uri = path.display().to_string();
	}
	debug!(
		bundle = %bundle.id,
		path = %path.display(),
		fragments = bundle.fragments.len(),
		"loaded bundle"
	);
	Ok(bundle)
}

/// Loads bundles from files and directories, in the given order.
///
/// Directories contribute their `*.toml` files sorted by file name.
pub fn load_bundles(paths: &[PathBuf]) -> Result<Vec<Bundle>> {
	let mut bundles = Vec::new();
	for path in paths {
		if path.is_dir() {
			for file in bundle_files(path)? {
				bundles.push(load_bundle(&file)?);
			}
		} else {
			bundles.push(load_bundle(path)?);
		}
	}
	Ok(bundles)
}

fn bundle_files(dir: &Path) -> Result<Vec<PathBuf>> {
	let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::io(dir, e))?;
	let mut files = Vec::new();
	for entry in entries {
		let path = entry.map_err(|e| ConfigError::io(dir, e))?.path();
		if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
			files.push(path);
		}
	}
	files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
	Ok(files)
}

fn read(path: &Path) -> Result<String> {
	std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
}

fn parse_toml<T: DeserializeOwned>(input: &str, path: &Path) -> Result<T> {
	toml::from_str(input).map_err(|error| ConfigError::Toml {
		path: path.to_path_buf(),
		error,
	})
}
