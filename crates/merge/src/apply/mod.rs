use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use trellis_model::{
	ContributorTable, FeatureSchema, Node, contains_id, find_by_id, find_by_id_mut, find_feature,
	position_in,
};

use crate::batch::Batch;
use crate::diagnostics::{Diagnostic, DiagnosticsSink, emit};
use crate::fragment::Fragment;
use crate::ordering;

/// Merge behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
	/// Retry fragments whose parent is missing after the rest of the pass.
	pub defer_unresolved_parents: bool,
	/// Tag inserted elements with their contributor and index them in the
	/// [`ContributorTable`].
	pub record_contributors: bool,
}

impl Default for MergeOptions {
	fn default() -> Self {
		Self {
			defer_unresolved_parents: true,
			record_contributors: true,
		}
	}
}

/// Counters for one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
	/// Fragments consumed without being dropped.
	pub applied: usize,
	/// Fragments dropped for a missing parent or unsupported feature.
	pub dropped: usize,
	/// Top-level elements spliced into the tree.
	pub inserted: usize,
	/// Elements skipped because their id already existed.
	pub skipped_duplicates: usize,
	/// Fragments postponed at least once for a missing parent.
	pub deferred: usize,
}

impl fmt::Display for MergeSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} applied, {} dropped, {} elements inserted, {} duplicates skipped, {} deferred",
			self.applied, self.dropped, self.inserted, self.skipped_duplicates, self.deferred
		)
	}
}

/// Applies batches to trees under one schema and option set.
#[derive(Debug, Clone)]
pub struct Merger<'s> {
	schema: &'s FeatureSchema,
	options: MergeOptions,
}

impl<'s> Merger<'s> {
	pub fn new(schema: &'s FeatureSchema) -> Self {
		Self {
			schema,
			options: MergeOptions::default(),
		}
	}

	pub fn with_options(mut self, options: MergeOptions) -> Self {
		self.options = options;
		self
	}

	pub fn options(&self) -> &MergeOptions {
		&self.options
	}

	/// Merges every fragment of `batch` into `tree` in processing order.
	///
	/// Nothing here fails: each problem is reported to `sink` and degraded.
	pub fn merge(
		&self,
		batch: Batch,
		tree: &mut Node,
		contributors: &mut ContributorTable,
		sink: &mut (impl DiagnosticsSink + ?Sized),
	) -> MergeSummary {
		let mut pass = Pass {
			schema: self.schema,
			options: self.options,
			tree,
			contributors,
			summary: MergeSummary::default(),
		};

		let fragments = batch.drain_into(sink);
		let mut deferred = Vec::new();
		for fragment in ordering::keyed(fragments).into_values() {
			if let Err(fragment) = pass.apply(fragment, sink) {
				if self.options.defer_unresolved_parents {
					debug!(seq = fragment.seq, parent = %fragment.parent_id, "deferring fragment");
					pass.summary.deferred += 1;
					deferred.push(fragment);
				} else {
					pass.drop_orphan(fragment, sink);
				}
			}
		}

		while !deferred.is_empty() {
			let waiting = deferred.len();
			let mut unresolved = Vec::new();
			for fragment in deferred {
				if let Err(fragment) = pass.apply(fragment, sink) {
					unresolved.push(fragment);
				}
			}
			deferred = unresolved;
			if deferred.len() == waiting {
				break;
			}
		}
		for fragment in deferred {
			pass.drop_orphan(fragment, sink);
		}

		debug!(summary = %pass.summary, "merge pass complete");
		pass.summary
	}
}

/// Merges `batch` into `tree` with the open schema and default options.
pub fn merge(
	batch: Batch,
	tree: &mut Node,
	contributors: &mut ContributorTable,
	sink: &mut (impl DiagnosticsSink + ?Sized),
) -> MergeSummary {
	let schema = FeatureSchema::open();
	Merger::new(&schema).merge(batch, tree, contributors, sink)
}

struct Pass<'a> {
	schema: &'a FeatureSchema,
	options: MergeOptions,
	tree: &'a mut Node,
	contributors: &'a mut ContributorTable,
	summary: MergeSummary,
}

impl Pass<'_> {
	/// Applies one fragment. Hands the fragment back if its parent does not exist yet.
	fn apply(
		&mut self,
		mut fragment: Fragment,
		sink: &mut (impl DiagnosticsSink + ?Sized),
	) -> Result<(), Fragment> {
		let Some(parent) = find_by_id(self.tree, &fragment.parent_id) else {
			return Err(fragment);
		};

		if !self.schema.supports(parent, &fragment.feature_name) {
			emit(
				sink,
				Diagnostic::FeatureUnsupported {
					seq: fragment.seq,
					contributor_id: fragment.contributor_id.clone(),
					parent_id: fragment.parent_id.clone(),
					feature_name: fragment.feature_name.clone(),
				},
			);
			self.summary.dropped += 1;
			return Ok(());
		}

		if fragment.check_exists {
			let tree: &Node = self.tree;
			let summary = &mut self.summary;
			fragment.elements.retain(|element| {
				let Some(id) = element.id().filter(|id| contains_id(tree, id)) else {
					return true;
				};
				emit(
					sink,
					Diagnostic::DuplicateElementSkipped {
						seq: fragment.seq,
						contributor_id: fragment.contributor_id.clone(),
						element_id: id.to_string(),
					},
				);
				summary.skipped_duplicates += 1;
				false
			});
		}
		if fragment.elements.is_empty() {
			self.summary.applied += 1;
			return Ok(());
		}

		if self.options.record_contributors {
			let attribution = fragment.attribution();
			for element in &mut fragment.elements {
				self.contributors.record_contribution(self.tree, element, &attribution);
			}
		}

		let anchor = fragment.position.anchor();
		let anchor_in_tree = anchor.is_some_and(|id| contains_id(self.tree, id));

		let Some(list) = find_by_id_mut(self.tree, &fragment.parent_id)
			.and_then(|parent| find_feature(parent, &fragment.feature_name, self.schema))
		else {
			return Err(fragment);
		};

		let anchor_at = anchor.and_then(|id| position_in(list, id));
		if let (Some(anchor), None) = (anchor, anchor_at) {
			emit(
				sink,
				Diagnostic::AnchorNotFound {
					seq: fragment.seq,
					contributor_id: fragment.contributor_id.clone(),
					parent_id: fragment.parent_id.clone(),
					feature_name: fragment.feature_name.clone(),
					anchor: anchor.to_string(),
					elsewhere: anchor_in_tree,
				},
			);
		}
		let index = fragment.position.insertion_index(list.len(), anchor_at);

		let count = fragment.elements.len();
		debug!(
			seq = fragment.seq,
			contributor = %fragment.contributor_id,
			parent = %fragment.parent_id,
			feature = %fragment.feature_name,
			position = %fragment.position,
			index,
			count,
			"applying fragment"
		);
		list.splice(index..index, fragment.elements);

		self.summary.applied += 1;
		self.summary.inserted += count;
		Ok(())
	}

	fn drop_orphan(&mut self, fragment: Fragment, sink: &mut (impl DiagnosticsSink + ?Sized)) {
		emit(
			sink,
			Diagnostic::ParentNotFound {
				seq: fragment.seq,
				contributor_id: fragment.contributor_id,
				parent_id: fragment.parent_id,
			},
		);
		self.summary.dropped += 1;
	}
}

#[cfg(test)]
mod tests;
