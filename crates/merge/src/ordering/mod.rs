//! Total processing order over a batch.
//!
//! Fragments are grouped by [`Category`] in its declared order. Within a group:
//!
//! - `Index`: ascending index value, then encounter order.
//! - `Unspecified`, `First`, `Last`: encounter order.
//! - `After`, `Before`: a fragment whose top-level elements provide another fragment's anchor
//!   comes first. Unrelated fragments go most recently encountered first. Fragments that
//!   anchor on each other form a cycle that is processed in encounter order.
//!
//! The order is computed once per batch and exposed as an [`OrderKey`] per fragment.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use rustc_hash::FxHashMap as HashMap;
use trellis_toposort::DependencyGraph;

use crate::fragment::Fragment;
use crate::position::{Category, PositionRule};

/// Sort key of one fragment within its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderKey {
	category: Category,
	rank: usize,
	seq: u32,
}

impl OrderKey {
	pub fn category(&self) -> Category {
		self.category
	}

	/// Position within the category.
	pub fn rank(&self) -> usize {
		self.rank
	}

	pub fn seq(&self) -> u32 {
		self.seq
	}
}

/// Processing order of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentOrder {
	/// Key of each fragment, indexed like the input slice.
	keys: Vec<OrderKey>,
	/// Input indices in processing order.
	order: Vec<usize>,
	/// Sequence numbers of fragments anchoring on each other.
	cycles: Vec<Vec<u32>>,
}

impl FragmentOrder {
	/// Returns the key of the fragment at `index` in the input slice.
	pub fn key(&self, index: usize) -> Option<OrderKey> {
		self.keys.get(index).copied()
	}

	/// Input indices in processing order.
	pub fn indices(&self) -> &[usize] {
		&self.order
	}

	/// Anchor cycles found, as sequence numbers in processing order.
	pub fn cycles(&self) -> &[Vec<u32>] {
		&self.cycles
	}
}

/// Computes the processing order of `fragments`.
pub fn order(fragments: &[Fragment]) -> FragmentOrder {
	let mut groups: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
	for (index, fragment) in fragments.iter().enumerate() {
		groups.entry(fragment.category()).or_default().push(index);
	}

	let mut result = FragmentOrder {
		keys: vec![
			OrderKey {
				category: Category::Unspecified,
				rank: 0,
				seq: 0,
			};
			fragments.len()
		],
		order: Vec::with_capacity(fragments.len()),
		cycles: Vec::new(),
	};

	for (category, mut members) in groups {
		members.sort_by_key(|&i| fragments[i].seq);
		match category {
			Category::Index => {
				members.sort_by_key(|&i| (index_value(&fragments[i].position), fragments[i].seq));
			}
			Category::Unspecified | Category::First | Category::Last => {}
			Category::After | Category::Before => {
				members = order_relative(fragments, &members, &mut result.cycles);
			}
		}

		for (rank, &index) in members.iter().enumerate() {
			result.keys[index] = OrderKey {
				category,
				rank,
				seq: fragments[index].seq,
			};
		}
		result.order.extend(members);
	}
	result
}

/// Keys every fragment. Iterating the map yields processing order.
pub fn keyed(fragments: Vec<Fragment>) -> BTreeMap<OrderKey, Fragment> {
	let order = order(&fragments);
	fragments
		.into_iter()
		.enumerate()
		.map(|(index, fragment)| (order.keys[index], fragment))
		.collect()
}

fn index_value(position: &PositionRule) -> i64 {
	match position {
		PositionRule::Index(n) => *n,
		_ => 0,
	}
}

/// Orders one relative group. `members` are input indices sorted by sequence number.
fn order_relative(
	fragments: &[Fragment],
	members: &[usize],
	cycles: &mut Vec<Vec<u32>>,
) -> Vec<usize> {
	let mut providers: HashMap<&str, Vec<usize>> = HashMap::default();
	for (local, &index) in members.iter().enumerate() {
		for id in fragments[index].provided_ids() {
			let entry = providers.entry(id).or_default();
			if !entry.contains(&local) {
				entry.push(local);
			}
		}
	}

	let mut graph = DependencyGraph::new(members.len());
	for (local, &index) in members.iter().enumerate() {
		let Some(anchor) = fragments[index].position.anchor() else {
			continue;
		};
		for &provider in providers.get(anchor).into_iter().flatten() {
			graph.add_dependency(local, provider);
		}
	}

	let topo = graph.order_by(|local| Reverse(fragments[members[local]].seq));
	for cycle in topo.cycles {
		let seqs: Vec<u32> = cycle
			.iter()
			.map(|&local| fragments[members[local]].seq)
			.collect();
		tracing::debug!(?seqs, "anchor cycle resolved in encounter order");
		cycles.push(seqs);
	}
	topo.order.into_iter().map(|local| members[local]).collect()
}
