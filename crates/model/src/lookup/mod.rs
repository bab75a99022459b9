//! Whole-tree lookups.
//!
//! All searches are depth-first pre-order: a node is visited before its children, features
//! are visited in declaration order, and children in list order. The first match wins.

use crate::{FeatureSchema, Node};

/// Finds the first node carrying `id` anywhere under (and including) `root`.
pub fn find_by_id<'a>(root: &'a Node, id: &str) -> Option<&'a Node> {
	if root.has_id(id) {
		return Some(root);
	}
	root.all_children().find_map(|child| find_by_id(child, id))
}

/// Mutable variant of [`find_by_id`].
pub fn find_by_id_mut<'a>(root: &'a mut Node, id: &str) -> Option<&'a mut Node> {
	if root.has_id(id) {
		return Some(root);
	}
	root.children_by_feature
		.values_mut()
		.flat_map(|children| children.iter_mut())
		.find_map(|child| find_by_id_mut(child, id))
}

/// Returns true if any node under (and including) `root` carries `id`.
#[inline]
pub fn contains_id(root: &Node, id: &str) -> bool {
	find_by_id(root, id).is_some()
}

/// Returns the mutable child list of `feature` on `node`.
///
/// The list is created empty when the schema allows the feature but the node has no children
/// for it yet. Returns `None` when the schema rejects the feature.
pub fn find_feature<'a>(
	node: &'a mut Node,
	feature: &str,
	schema: &FeatureSchema,
) -> Option<&'a mut Vec<Node>> {
	if !schema.supports(node, feature) {
		return None;
	}
	Some(
		node.children_by_feature
			.entry(feature.to_string())
			.or_default(),
	)
}

/// Returns the index of the first direct member of `list` carrying `id`.
#[inline]
pub fn position_in(list: &[Node], id: &str) -> Option<usize> {
	list.iter().position(|node| node.has_id(id))
}

/// Counts every node under (and including) `root`.
pub fn count_nodes(root: &Node) -> usize {
	1 + root.all_children().map(count_nodes).sum::<usize>()
}
