//! Text renderings of assembled trees and processing orders.

use std::fmt;

use trellis_merge::{Fragment, FragmentOrder};
use trellis_model::Node;

const INDENT: &str = "  ";

/// Indented outline of a tree. Contributed nodes, and the nodes inside them, are suffixed with
/// `<- contributor`.
pub struct Outline<'a> {
	pub tree: &'a Node,
}

impl fmt::Display for Outline<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.node(f, self.tree, 0, None)
	}
}

impl Outline<'_> {
	fn node(
		&self,
		f: &mut fmt::Formatter<'_>,
		node: &Node,
		depth: usize,
		inherited: Option<&str>,
	) -> fmt::Result {
		write!(f, "{}{}", INDENT.repeat(depth), node.id().unwrap_or("<anonymous>"))?;
		if let Some(kind) = &node.kind {
			write!(f, " ({kind})")?;
		}
		let contributor = node.contributor().or(inherited);
		if let Some(contributor) = contributor {
			write!(f, " <- {contributor}")?;
		}
		writeln!(f)?;

		for (feature, children) in &node.children_by_feature {
			writeln!(f, "{}[{feature}]", INDENT.repeat(depth + 1))?;
			for child in children {
				self.node(f, child, depth + 2, contributor)?;
			}
		}
		Ok(())
	}
}

/// One line per fragment in processing order.
pub struct OrderTable<'a> {
	pub fragments: &'a [Fragment],
	pub order: &'a FragmentOrder,
}

impl fmt::Display for OrderTable<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for &index in self.order.indices() {
			let fragment = &self.fragments[index];
			let contributor = if fragment.contributor_id.is_empty() {
				"-"
			} else {
				fragment.contributor_id.as_str()
			};
			writeln!(
				f,
				"{:>4}  {:<11}  {:<16}  {}/{}  {}",
				fragment.seq,
				fragment.category(),
				contributor,
				fragment.parent_id,
				fragment.feature_name,
				fragment.position
			)?;
		}
		Ok(())
	}
}
