use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An element of the composite tree.
///
/// Children are grouped by feature name. Feature order is the order features were first
/// populated, which keeps serialization and traversal stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
	/// Element id. Unique by convention, not enforced.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Type label consulted by [`crate::FeatureSchema`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Ordered child lists keyed by feature name.
	#[serde(
		default,
		rename = "features",
		skip_serializing_if = "IndexMap::is_empty"
	)]
	pub children_by_feature: IndexMap<String, Vec<Node>>,
	/// Contributor that spliced this node into the tree. Base-tree nodes carry none.
	#[serde(skip)]
	pub contributed_by: Option<String>,
}

impl Node {
	/// Creates a node with the given id and no children.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: Some(id.into()),
			..Self::default()
		}
	}

	/// Creates a node without an id.
	pub fn anonymous() -> Self {
		Self::default()
	}

	/// Sets the kind label.
	pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = Some(kind.into());
		self
	}

	/// Replaces the children of `feature`.
	pub fn with_children(mut self, feature: impl Into<String>, children: Vec<Node>) -> Self {
		self.children_by_feature.insert(feature.into(), children);
		self
	}

	/// Appends one child to `feature`.
	pub fn with_child(mut self, feature: impl Into<String>, child: Node) -> Self {
		self.children_by_feature
			.entry(feature.into())
			.or_default()
			.push(child);
		self
	}

	/// Returns the id, if any.
	#[inline]
	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	/// Returns the contributor that spliced this node in, if any.
	#[inline]
	pub fn contributor(&self) -> Option<&str> {
		self.contributed_by.as_deref()
	}

	/// Returns true if this node carries exactly `id`.
	#[inline]
	pub fn has_id(&self, id: &str) -> bool {
		self.id.as_deref() == Some(id)
	}

	/// Returns the children of `feature`, or an empty slice.
	pub fn children(&self, feature: &str) -> &[Node] {
		self.children_by_feature
			.get(feature)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Returns the ids of the direct children of `feature`, skipping id-less nodes.
	pub fn child_ids(&self, feature: &str) -> Vec<&str> {
		self.children(feature).iter().filter_map(Node::id).collect()
	}

	/// Iterates over all direct children across every feature.
	pub fn all_children(&self) -> impl Iterator<Item = &Node> + '_ {
		self.children_by_feature.values().flatten()
	}

	/// Collects every id in this subtree, self included, in depth-first pre-order.
	pub fn descendant_ids(&self) -> Vec<&str> {
		let mut out = Vec::new();
		collect_ids(self, &mut out);
		out
	}
}

fn collect_ids<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
	if let Some(id) = node.id() {
		out.push(id);
	}
	for child in node.all_children() {
		collect_ids(child, out);
	}
}
