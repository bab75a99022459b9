//! Cycle-tolerant topological ordering.
//!
//! # Role
//!
//! Orders items so that every prerequisite precedes its dependents, without ever rejecting
//! input. Used to sequence contributor bundles before a merge pass and to order anchor
//! dependencies between fragments.
//!
//! # Contract
//!
//! 1. Items are identified by their encounter index (`0..len`).
//! 2. Strongly connected components are emitted as a unit. Members of a cycle keep ascending
//!    encounter order; every cycle is reported in [`TopoOrder::cycles`].
//! 3. Among components that are ready at the same time, the one whose first member has the
//!    smallest caller-supplied rank is emitted first. [`DependencyGraph::order`] ranks by
//!    encounter index.
//! 4. The result is a pure function of the edges and ranks: insertion order of edges does not
//!    matter.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::hash::Hash;

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

/// Result of a topological ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopoOrder {
	/// Every item index exactly once, prerequisites first.
	pub order: Vec<usize>,
	/// Members of each cycle found, ascending, in emission order.
	pub cycles: Vec<Vec<usize>>,
}

impl TopoOrder {
	/// Returns true if the input contained no cycle.
	pub fn is_acyclic(&self) -> bool {
		self.cycles.is_empty()
	}
}

/// Directed dependency graph over item indices.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
	/// `dependents[p]` lists the items that require `p`.
	dependents: Vec<Vec<usize>>,
}

impl DependencyGraph {
	/// Creates a graph of `len` items with no edges.
	pub fn new(len: usize) -> Self {
		Self {
			dependents: vec![Vec::new(); len],
		}
	}

	pub fn len(&self) -> usize {
		self.dependents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.dependents.is_empty()
	}

	/// Declares that `dependent` must come after `prerequisite`.
	///
	/// Self-edges and out-of-range indices are ignored.
	pub fn add_dependency(&mut self, dependent: usize, prerequisite: usize) {
		if dependent == prerequisite || dependent >= self.len() || prerequisite >= self.len() {
			return;
		}
		let edges = &mut self.dependents[prerequisite];
		if !edges.contains(&dependent) {
			edges.push(dependent);
		}
	}

	/// Returns true if `dependent` directly requires `prerequisite`.
	pub fn depends_on(&self, dependent: usize, prerequisite: usize) -> bool {
		self.dependents
			.get(prerequisite)
			.is_some_and(|edges| edges.contains(&dependent))
	}

	/// Orders items, breaking ties by encounter index.
	pub fn order(&self) -> TopoOrder {
		self.order_by(|index| index)
	}

	/// Orders items, breaking ties by `rank` (smallest first).
	///
	/// The rank of a cycle is the rank of its first-encountered member.
	pub fn order_by<K: Ord>(&self, rank: impl Fn(usize) -> K) -> TopoOrder {
		let components = Tarjan::run(&self.dependents);
		let mut component_of = vec![0usize; self.len()];
		for (c, members) in components.iter().enumerate() {
			for &m in members {
				component_of[m] = c;
			}
		}

		let mut successors: Vec<HashSet<usize>> = vec![HashSet::default(); components.len()];
		let mut in_degree = vec![0usize; components.len()];
		for (prerequisite, dependents) in self.dependents.iter().enumerate() {
			let from = component_of[prerequisite];
			for &dependent in dependents {
				let to = component_of[dependent];
				if from != to && successors[from].insert(to) {
					in_degree[to] += 1;
				}
			}
		}

		let mut by_rank: Vec<usize> = (0..components.len()).collect();
		by_rank.sort_by_cached_key(|&c| (rank(components[c][0]), components[c][0]));
		let mut ordinal = vec![0usize; components.len()];
		for (position, &c) in by_rank.iter().enumerate() {
			ordinal[c] = position;
		}

		let mut ready: BinaryHeap<Reverse<(usize, usize)>> = in_degree
			.iter()
			.enumerate()
			.filter(|&(_, &degree)| degree == 0)
			.map(|(c, _)| Reverse((ordinal[c], c)))
			.collect();

		let mut result = TopoOrder {
			order: Vec::with_capacity(self.len()),
			cycles: Vec::new(),
		};
		while let Some(Reverse((_, c))) = ready.pop() {
			let members = &components[c];
			result.order.extend_from_slice(members);
			if members.len() > 1 {
				result.cycles.push(members.clone());
			}

			let mut next: Vec<usize> = successors[c].iter().copied().collect();
			next.sort_unstable();
			for to in next {
				in_degree[to] -= 1;
				if in_degree[to] == 0 {
					ready.push(Reverse((ordinal[to], to)));
				}
			}
		}
		result
	}
}

/// Orders `items` so that each one follows the items whose keys it requires.
///
/// Requirements on unknown keys are ignored. When several items share a key, requirements
/// resolve to the first of them.
pub fn sort_by_requirements<'a, T, K, I>(
	items: &'a [T],
	key: impl Fn(&'a T) -> K,
	requires: impl Fn(&'a T) -> I,
) -> TopoOrder
where
	K: Eq + Hash,
	I: IntoIterator<Item = K>,
{
	let mut index_of: HashMap<K, usize> = HashMap::default();
	for (i, item) in items.iter().enumerate() {
		index_of.entry(key(item)).or_insert(i);
	}

	let mut graph = DependencyGraph::new(items.len());
	for (i, item) in items.iter().enumerate() {
		for required in requires(item) {
			if let Some(&prerequisite) = index_of.get(&required) {
				graph.add_dependency(i, prerequisite);
			}
		}
	}
	graph.order()
}

/// Tarjan's strongly connected components over a successor list.
struct Tarjan<'g> {
	successors: &'g [Vec<usize>],
	index: Vec<Option<usize>>,
	low: Vec<usize>,
	on_stack: Vec<bool>,
	stack: Vec<usize>,
	next: usize,
	components: Vec<Vec<usize>>,
}

impl<'g> Tarjan<'g> {
	fn run(successors: &'g [Vec<usize>]) -> Vec<Vec<usize>> {
		let len = successors.len();
		let mut tarjan = Tarjan {
			successors,
			index: vec![None; len],
			low: vec![0; len],
			on_stack: vec![false; len],
			stack: Vec::new(),
			next: 0,
			components: Vec::new(),
		};
		for v in 0..len {
			if tarjan.index[v].is_none() {
				tarjan.visit(v);
			}
		}
		tarjan.components
	}

	/// Depth-first search from `root` with an explicit frame stack, so chain length is not
	/// bounded by the thread stack.
	fn visit(&mut self, root: usize) {
		let successors = self.successors;
		let mut frames: Vec<(usize, usize)> = Vec::new();
		self.enter(root);
		frames.push((root, 0));

		while let Some(frame) = frames.last_mut() {
			let (v, next_edge) = *frame;
			if let Some(&w) = successors[v].get(next_edge) {
				frame.1 += 1;
				match self.index[w] {
					None => {
						self.enter(w);
						frames.push((w, 0));
					}
					Some(w_index) if self.on_stack[w] => {
						self.low[v] = self.low[v].min(w_index);
					}
					Some(_) => {}
				}
				continue;
			}

			frames.pop();
			if let Some(&(parent, _)) = frames.last() {
				self.low[parent] = self.low[parent].min(self.low[v]);
			}
			if self.index[v] == Some(self.low[v]) {
				self.close(v);
			}
		}
	}

	fn enter(&mut self, v: usize) {
		self.index[v] = Some(self.next);
		self.low[v] = self.next;
		self.next += 1;
		self.stack.push(v);
		self.on_stack[v] = true;
	}

	/// Pops the component rooted at `v`.
	fn close(&mut self, v: usize) {
		let mut component = Vec::new();
		while let Some(w) = self.stack.pop() {
			self.on_stack[w] = false;
			component.push(w);
			if w == v {
				break;
			}
		}
		component.sort_unstable();
		self.components.push(component);
	}
}
