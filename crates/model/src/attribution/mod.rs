//! Contributor attribution.
//!
//! Merged elements are attributed to the contributor that introduced them. Each spliced node is
//! tagged with its contributor ([`Node::contributed_by`]); the table indexes attributions by
//! element id and travels alongside the tree, so independent trees keep independent tables.

use rustc_hash::FxHashMap as HashMap;

use crate::{Node, contains_id};

/// Who introduced an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
	/// Contributor (bundle) id.
	pub contributor_id: String,
	/// Location the contribution was loaded from.
	pub contributor_uri: String,
	/// Sequence number of the fragment that inserted the element.
	pub seq: u32,
}

/// Element id to [`Attribution`] side-table.
#[derive(Debug, Clone, Default)]
pub struct ContributorTable {
	by_element: HashMap<String, Attribution>,
}

impl ContributorTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `attribution` for `element_id`, returning the previous entry if the id was
	/// already attributed.
	pub fn record(
		&mut self,
		element_id: impl Into<String>,
		attribution: Attribution,
	) -> Option<Attribution> {
		self.by_element.insert(element_id.into(), attribution)
	}

	/// Attributes `element`, which is about to be spliced into `tree`.
	///
	/// The element is tagged with the contributor. Ids in its subtree that already exist in
	/// `tree` keep their current attribution.
	pub fn record_contribution(
		&mut self,
		tree: &Node,
		element: &mut Node,
		attribution: &Attribution,
	) {
		element.contributed_by = Some(attribution.contributor_id.clone());
		for id in element.descendant_ids() {
			if !contains_id(tree, id) {
				self.record(id, attribution.clone());
			}
		}
	}

	/// Returns the attribution of `element_id`.
	pub fn get(&self, element_id: &str) -> Option<&Attribution> {
		self.by_element.get(element_id)
	}

	/// Returns the contributor id that introduced `element_id`.
	pub fn contributor_of(&self, element_id: &str) -> Option<&str> {
		self.get(element_id).map(|a| a.contributor_id.as_str())
	}

	/// Returns the ids attributed to `contributor_id`, sorted.
	pub fn elements_of(&self, contributor_id: &str) -> Vec<&str> {
		let mut ids: Vec<&str> = self
			.by_element
			.iter()
			.filter(|(_, a)| a.contributor_id == contributor_id)
			.map(|(id, _)| id.as_str())
			.collect();
		ids.sort_unstable();
		ids
	}

	/// Drops the attribution of `element_id`.
	pub fn forget(&mut self, element_id: &str) -> Option<Attribution> {
		self.by_element.remove(element_id)
	}

	pub fn len(&self) -> usize {
		self.by_element.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_element.is_empty()
	}
}

/// Detaches every subtree spliced in by `contributor_id`.
///
/// Ids inside a removed subtree that were attributed to the contributor are forgotten. `root` itself is never
/// removed. Returns the number of subtrees detached.
pub fn remove_contributions(
	root: &mut Node,
	table: &mut ContributorTable,
	contributor_id: &str,
) -> usize {
	let mut removed = Vec::new();
	detach(root, contributor_id, &mut removed);
	for node in &removed {
		for id in node.descendant_ids() {
			if table.contributor_of(id) == Some(contributor_id) {
				table.forget(id);
			}
		}
	}
	removed.len()
}

fn detach(node: &mut Node, contributor_id: &str, removed: &mut Vec<Node>) {
	for children in node.children_by_feature.values_mut() {
		let mut kept = Vec::with_capacity(children.len());
		for child in children.drain(..) {
			if child.contributor() == Some(contributor_id) {
				removed.push(child);
			} else {
				kept.push(child);
			}
		}
		*children = kept;
		for child in children.iter_mut() {
			detach(child, contributor_id, removed);
		}
	}
}
