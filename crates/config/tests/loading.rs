//! Loader tests against configuration trees written to a temporary directory.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use trellis_config::{AssemblyConfig, ConfigError, load_bundle, load_bundles, load_tree};
use trellis_model::Node;

fn write(dir: &Path, name: &str, content: &str) {
	let path = dir.join(name);
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).unwrap();
	}
	fs::write(path, content).unwrap();
}

const BASE: &str = r#"
id = "app"

[[features.children]]
id = "toolbar"
kind = "toolbar"

[[features.children.features.children]]
id = "x"
"#;

const EDITOR: &str = r#"
id = "editor"
requires = ["core"]

[[fragments]]
parent = "toolbar"
feature = "children"
position = "first"

[[fragments.elements]]
id = "save"
"#;

#[test]
fn test_config_resolves_paths_against_its_directory() {
	let dir = tempfile::tempdir().unwrap();
	write(
		dir.path(),
		"assembly.toml",
		r#"
base = "app.toml"
bundles = ["plugins", "extra/one.toml"]

[merge]
record_contributors = false

[schema.toolbar]
features = ["children"]
"#,
	);

	let config = AssemblyConfig::load(dir.path().join("assembly.toml")).unwrap();
	assert_eq!(config.base, dir.path().join("app.toml"));
	assert_eq!(
		config.bundles,
		vec![dir.path().join("plugins"), dir.path().join("extra/one.toml")]
	);
	assert!(config.merge.defer_unresolved_parents);
	assert!(!config.merge.record_contributors);

	let schema = config.feature_schema();
	let toolbar = Node::new("t").with_kind("toolbar");
	assert!(schema.supports(&toolbar, "children"));
	assert!(!schema.supports(&toolbar, "trimBars"));
	assert!(schema.supports(&Node::new("free"), "anything"));
}

#[test]
fn test_minimal_config_uses_defaults() {
	let config = AssemblyConfig::parse("base = \"tree.json\"", Path::new("conf/a.toml")).unwrap();
	assert_eq!(config.base, Path::new("conf/tree.json"));
	assert!(config.bundles.is_empty());
	assert!(config.feature_schema().is_open());
}

#[test]
fn test_unknown_config_keys_are_rejected() {
	let err = AssemblyConfig::parse("base = \"a.toml\"\nbundle = []", Path::new("a.toml"))
		.unwrap_err();
	assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn test_trees_load_from_toml_and_json() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "app.toml", BASE);
	write(
		dir.path(),
		"app.json",
		r#"{ "id": "app", "features": { "children": [ { "id": "toolbar", "kind": "toolbar",
			"features": { "children": [ { "id": "x" } ] } } ] } }"#,
	);

	let from_toml = load_tree(dir.path().join("app.toml")).unwrap();
	let from_json = load_tree(dir.path().join("app.json")).unwrap();
	assert_eq!(from_toml, from_json);
	assert_eq!(
		from_toml,
		Node::new("app").with_child(
			"children",
			Node::new("toolbar")
				.with_kind("toolbar")
				.with_child("children", Node::new("x")),
		)
	);
}

#[test]
fn test_tree_format_errors() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "app.yaml", "id: app");
	write(dir.path(), "broken.json", "{ \"id\": ");

	assert!(matches!(
		load_tree(dir.path().join("app.yaml")),
		Err(ConfigError::UnsupportedFormat(_))
	));
	assert!(matches!(
		load_tree(dir.path().join("broken.json")),
		Err(ConfigError::Json { .. })
	));
	assert!(matches!(
		load_tree(dir.path().join("missing.toml")),
		Err(ConfigError::Io { .. })
	));
}

#[test]
fn test_bundle_defaults_uri_to_path() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "editor.toml", EDITOR);
	let path = dir.path().join("editor.toml");

	let bundle = load_bundle(&path).unwrap();
	assert_eq!(bundle.id, "editor");
	assert_eq!(bundle.uri, path.display().to_string());
	assert_eq!(bundle.requires, ["core"]);
	assert_eq!(bundle.fragments.len(), 1);

	let fragment = &bundle.fragments[0];
	assert_eq!(fragment.parent_id, "toolbar");
	assert_eq!(fragment.feature_name, "children");
	assert_eq!(fragment.position.as_deref(), Some("first"));
	assert!(!fragment.check_exists);
	assert_eq!(fragment.elements, [Node::new("save")]);
}

#[test]
fn test_directories_load_sorted_by_file_name() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "plugins/20-b.toml", "id = \"b\"");
	write(dir.path(), "plugins/10-a.toml", "id = \"a\"\nuri = \"mem://a\"");
	write(dir.path(), "plugins/notes.txt", "ignored");
	write(dir.path(), "last.toml", "id = \"z\"");

	let bundles = load_bundles(&[dir.path().join("last.toml"), dir.path().join("plugins")])
		.unwrap();
	let ids: Vec<&str> = bundles.iter().map(|b| b.id.as_str()).collect();
	assert_eq!(ids, ["z", "a", "b"]);
	assert_eq!(bundles[1].uri, "mem://a");
}

#[test]
fn test_config_loads_inputs() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "assembly.toml", "base = \"app.toml\"\nbundles = [\"editor.toml\"]");
	write(dir.path(), "app.toml", BASE);
	write(dir.path(), "editor.toml", EDITOR);

	let config = AssemblyConfig::load(dir.path().join("assembly.toml")).unwrap();
	let tree = config.load_base().unwrap();
	let bundles = config.load_bundles().unwrap();
	assert_eq!(tree.id(), Some("app"));
	assert_eq!(bundles.len(), 1);
}
