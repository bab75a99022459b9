use pretty_assertions::assert_eq;
use trellis_model::remove_contributions;

use super::*;
use crate::diagnostics::DiagnosticKind;
use crate::fragment::FragmentRecord;

fn app(toolbar: &[&str]) -> Node {
	Node::new("app").with_child(
		"children",
		Node::new("toolbar")
			.with_kind("toolbar")
			.with_children("children", toolbar.iter().map(|id| Node::new(*id)).collect()),
	)
}

fn child_ids(tree: &Node, parent: &str, feature: &str) -> Vec<String> {
	find_by_id(tree, parent)
		.map(|node| node.child_ids(feature).into_iter().map(str::to_string).collect())
		.unwrap_or_default()
}

fn fragment(parent: &str, ids: &[&str], position: &str) -> FragmentRecord {
	FragmentRecord::new(parent, "children")
		.with_elements(ids.iter().map(|id| Node::new(*id)).collect())
		.with_position(position)
		.with_contributor("editor", "file:///editor.toml")
}

fn run(tree: &mut Node, records: Vec<FragmentRecord>) -> (MergeSummary, Vec<Diagnostic>) {
	let mut diagnostics = Vec::new();
	let mut contributors = ContributorTable::new();
	let summary = merge(
		Batch::from_records(records),
		tree,
		&mut contributors,
		&mut diagnostics,
	);
	(summary, diagnostics)
}

fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
	diagnostics.iter().map(Diagnostic::kind).collect()
}

#[test]
fn check_exists_skips_elements_already_in_tree() {
	let mut tree = app(&["x", "y", "z"]);
	let (summary, diagnostics) = run(
		&mut tree,
		vec![fragment("toolbar", &["y", "n"], "last").with_check_exists(true)],
	);

	assert_eq!(child_ids(&tree, "toolbar", "children"), ["x", "y", "z", "n"]);
	assert_eq!(summary.skipped_duplicates, 1);
	assert_eq!(summary.inserted, 1);
	assert_eq!(
		diagnostics,
		vec![Diagnostic::DuplicateElementSkipped {
			seq: 0,
			contributor_id: "editor".into(),
			element_id: "y".into(),
		}]
	);
}

#[test]
fn fragment_emptied_by_check_exists_contributes_nothing() {
	let mut tree = app(&["x", "y", "z"]);
	let (summary, _) = run(
		&mut tree,
		vec![fragment("toolbar", &["x"], "first").with_check_exists(true)],
	);
	assert_eq!(child_ids(&tree, "toolbar", "children"), ["x", "y", "z"]);
	assert_eq!(summary.applied, 1);
	assert_eq!(summary.inserted, 0);
}

#[test]
fn duplicates_are_inserted_without_check_exists() {
	let mut tree = app(&["x", "y", "z"]);
	run(&mut tree, vec![fragment("toolbar", &["x"], "")]);
	assert_eq!(child_ids(&tree, "toolbar", "children"), ["x", "y", "z", "x"]);
}

#[test]
fn unsupported_feature_drops_fragment() {
	let mut tree = app(&["x"]);
	let schema = FeatureSchema::open().with_kind("toolbar", ["children"]);
	let mut diagnostics = Vec::new();
	let record = FragmentRecord::new("toolbar", "trimBars").with_elements(vec![Node::new("t")]);

	let summary = Merger::new(&schema).merge(
		Batch::from_records([record]),
		&mut tree,
		&mut ContributorTable::new(),
		&mut diagnostics,
	);

	assert_eq!(summary.dropped, 1);
	assert_eq!(kinds(&diagnostics), [DiagnosticKind::FeatureUnsupported]);
	assert!(find_by_id(&tree, "t").is_none());
	assert!(
		!find_by_id(&tree, "toolbar")
			.unwrap()
			.children_by_feature
			.contains_key("trimBars")
	);
}

#[test]
fn missing_parent_is_retried_after_the_pass() {
	let mut tree = app(&["x"]);
	let (summary, diagnostics) = run(
		&mut tree,
		vec![
			fragment("menu", &["open"], ""),
			fragment("toolbar", &["menu"], "last"),
		],
	);

	assert!(diagnostics.is_empty());
	assert_eq!(child_ids(&tree, "menu", "children"), ["open"]);
	assert_eq!(summary.deferred, 1);
	assert_eq!(summary.applied, 2);
}

#[test]
fn deferred_chains_resolve_over_several_rounds() {
	let mut tree = app(&[]);
	let (summary, diagnostics) = run(
		&mut tree,
		vec![
			fragment("b", &["c"], ""),
			fragment("a", &["b"], ""),
			fragment("toolbar", &["a"], ""),
		],
	);

	assert!(diagnostics.is_empty());
	assert_eq!(child_ids(&tree, "b", "children"), ["c"]);
	assert_eq!(summary.applied, 3);
	assert_eq!(summary.deferred, 2);
}

#[test]
fn unresolvable_parent_is_dropped_and_reported() {
	let mut tree = app(&["x"]);
	let before = tree.clone();
	let (summary, diagnostics) = run(&mut tree, vec![fragment("nowhere", &["a"], "first")]);

	assert_eq!(tree, before);
	assert_eq!(summary.dropped, 1);
	assert_eq!(
		diagnostics,
		vec![Diagnostic::ParentNotFound {
			seq: 0,
			contributor_id: "editor".into(),
			parent_id: "nowhere".into(),
		}]
	);
}

#[test]
fn deferral_can_be_disabled() {
	let mut tree = app(&["x"]);
	let schema = FeatureSchema::open();
	let merger = Merger::new(&schema).with_options(MergeOptions {
		defer_unresolved_parents: false,
		..MergeOptions::default()
	});
	let mut diagnostics = Vec::new();
	let batch = Batch::from_records([
		fragment("menu", &["open"], ""),
		fragment("toolbar", &["menu"], "last"),
	]);

	let summary = merger.merge(batch, &mut tree, &mut ContributorTable::new(), &mut diagnostics);

	assert_eq!(kinds(&diagnostics), [DiagnosticKind::ParentNotFound]);
	assert_eq!(summary.dropped, 1);
	assert_eq!(summary.deferred, 0);
	assert!(find_by_id(&tree, "open").is_none());
	assert!(find_by_id(&tree, "menu").is_some());
}

#[test]
fn anchor_under_another_parent_appends() {
	let mut tree = app(&["x", "y"]);
	find_by_id_mut(&mut tree, "app")
		.unwrap()
		.children_by_feature
		.entry("children".into())
		.or_default()
		.push(Node::new("menu").with_child("children", Node::new("m")));

	let (_, diagnostics) = run(&mut tree, vec![fragment("toolbar", &["a"], "before:m")]);

	assert_eq!(child_ids(&tree, "toolbar", "children"), ["x", "y", "a"]);
	assert!(matches!(
		diagnostics.as_slice(),
		[Diagnostic::AnchorNotFound { elsewhere: true, anchor, .. }] if anchor == "m"
	));
}

#[test]
fn inserted_subtrees_are_attributed() {
	let mut tree = app(&["x"]);
	let mut contributors = ContributorTable::new();
	let record = fragment("toolbar", &[], "first")
		.with_elements(vec![Node::new("a").with_child("children", Node::new("a1"))]);

	merge(
		Batch::from_records([fragment("toolbar", &["b"], ""), record]),
		&mut tree,
		&mut contributors,
		&mut (),
	);

	let attribution = contributors.get("a1").expect("a1 attributed");
	assert_eq!(attribution.contributor_id, "editor");
	assert_eq!(attribution.contributor_uri, "file:///editor.toml");
	assert_eq!(attribution.seq, 1);
	assert_eq!(contributors.elements_of("editor"), ["a", "a1", "b"]);
	assert!(contributors.get("x").is_none());

	assert_eq!(remove_contributions(&mut tree, &mut contributors, "editor"), 2);
	assert_eq!(tree, app(&["x"]));
	assert!(contributors.is_empty());
}

#[test]
fn removing_a_contributor_keeps_base_elements_with_the_same_id() {
	let mut tree = app(&["x", "y"]);
	let mut contributors = ContributorTable::new();
	let duplicate =
		fragment("toolbar", &["x"], "last").with_contributor("plugin", "file:///p.toml");

	merge(Batch::from_records([duplicate]), &mut tree, &mut contributors, &mut ());
	assert_eq!(child_ids(&tree, "toolbar", "children"), ["x", "y", "x"]);
	assert!(contributors.get("x").is_none());

	assert_eq!(remove_contributions(&mut tree, &mut contributors, "plugin"), 1);
	assert_eq!(tree, app(&["x", "y"]));
}

#[test]
fn attribution_can_be_disabled() {
	let mut tree = app(&[]);
	let schema = FeatureSchema::open();
	let mut contributors = ContributorTable::new();
	Merger::new(&schema)
		.with_options(MergeOptions {
			record_contributors: false,
			..MergeOptions::default()
		})
		.merge(
			Batch::from_records([fragment("toolbar", &["a"], "")]),
			&mut tree,
			&mut contributors,
			&mut (),
		);
	assert!(contributors.is_empty());
	assert_eq!(find_by_id(&tree, "a").and_then(Node::contributor), None);
}

#[test]
fn batch_diagnostics_reach_the_sink() {
	let mut tree = app(&["x"]);
	let (summary, diagnostics) = run(&mut tree, vec![fragment("toolbar", &["a"], "index:@")]);
	assert_eq!(kinds(&diagnostics), [DiagnosticKind::InvalidPositionSyntax]);
	assert_eq!(child_ids(&tree, "toolbar", "children"), ["x", "a"]);
	assert_eq!(summary.applied, 1);
}

#[test]
fn options_deserialize_with_defaults() {
	let options: MergeOptions =
		serde_json::from_str(r#"{ "record_contributors": false }"#).expect("valid options");
	assert!(options.defer_unresolved_parents);
	assert!(!options.record_contributors);
}
