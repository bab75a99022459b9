use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::Node;

/// Declares which features each node kind exposes.
///
/// Kinds without a declaration, and nodes without a kind, accept every feature. The default
/// schema is fully open.
#[derive(Debug, Clone, Default)]
pub struct FeatureSchema {
	kinds: HashMap<String, HashSet<String>>,
}

impl FeatureSchema {
	/// Returns a schema that accepts every feature on every node.
	pub fn open() -> Self {
		Self::default()
	}

	/// Restricts `kind` to the given features.
	pub fn declare<I, S>(&mut self, kind: impl Into<String>, features: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.kinds
			.entry(kind.into())
			.or_default()
			.extend(features.into_iter().map(Into::into));
	}

	/// Builder form of [`FeatureSchema::declare`].
	pub fn with_kind<I, S>(mut self, kind: impl Into<String>, features: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.declare(kind, features);
		self
	}

	/// Returns true if `node` may expose `feature`.
	pub fn supports(&self, node: &Node, feature: &str) -> bool {
		match node.kind.as_deref().and_then(|k| self.kinds.get(k)) {
			Some(features) => features.contains(feature),
			None => true,
		}
	}

	/// Returns true if no kind is restricted.
	pub fn is_open(&self) -> bool {
		self.kinds.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn undeclared_kinds_are_open() {
		let schema = FeatureSchema::open().with_kind("toolbar", ["children"]);

		let toolbar = Node::new("tb").with_kind("toolbar");
		let window = Node::new("w").with_kind("window");
		let plain = Node::new("p");

		assert!(schema.supports(&toolbar, "children"));
		assert!(!schema.supports(&toolbar, "trimBars"));
		assert!(schema.supports(&window, "trimBars"));
		assert!(schema.supports(&plain, "anything"));
		assert!(!schema.is_open());
	}
}
