use serde::{Deserialize, Serialize};
use trellis_toposort::sort_by_requirements;

use crate::diagnostics::{Diagnostic, DiagnosticsSink, emit};
use crate::fragment::{Fragment, FragmentRecord};
use crate::position::PositionRule;

/// One contributor's fragments and the contributors it must follow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
	pub id: String,
	#[serde(default)]
	pub uri: String,
	/// Ids of bundles whose fragments are sequenced before this bundle's.
	#[serde(default)]
	pub requires: Vec<String>,
	#[serde(default)]
	pub fragments: Vec<FragmentRecord>,
}

impl Bundle {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	pub fn requiring(mut self, id: impl Into<String>) -> Self {
		self.requires.push(id.into());
		self
	}

	pub fn with_fragment(mut self, record: FragmentRecord) -> Self {
		self.fragments.push(record);
		self
	}
}

/// All fragments of one assembly pass, in encounter order.
///
/// Sequence numbers are assigned on insertion and never reused. Problems found while building
/// the batch are held until the batch is merged.
#[derive(Debug, Clone, Default)]
pub struct Batch {
	fragments: Vec<Fragment>,
	pending: Vec<Diagnostic>,
	next_seq: u32,
}

impl Batch {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a batch from records in discovery order.
	pub fn from_records(records: impl IntoIterator<Item = FragmentRecord>) -> Self {
		let mut batch = Self::new();
		batch.extend(records);
		batch
	}

	/// Builds a batch from contributor bundles.
	///
	/// Bundles are sequenced after the bundles they require. Mutually requiring bundles keep
	/// their given order and are reported as [`Diagnostic::ContributorCycle`]. Every fragment is
	/// attributed to its bundle.
	pub fn from_bundles(bundles: Vec<Bundle>) -> Self {
		let topo = sort_by_requirements(
			&bundles,
			|bundle| bundle.id.as_str(),
			|bundle| bundle.requires.iter().map(String::as_str),
		);

		let mut batch = Self::new();
		for cycle in &topo.cycles {
			batch.pending.push(Diagnostic::ContributorCycle {
				members: cycle.iter().map(|&i| bundles[i].id.clone()).collect(),
			});
		}

		let mut slots: Vec<Option<Bundle>> = bundles.into_iter().map(Some).collect();
		for index in topo.order {
			let Some(bundle) = slots[index].take() else {
				continue;
			};
			tracing::debug!(
				bundle = %bundle.id,
				fragments = bundle.fragments.len(),
				"sequencing bundle"
			);
			for record in bundle.fragments {
				batch.push(record.with_contributor(bundle.id.as_str(), bundle.uri.as_str()));
			}
		}
		batch
	}

	/// Appends a record, returning its sequence number.
	pub fn push(&mut self, record: FragmentRecord) -> u32 {
		let seq = self.next_seq;
		self.next_seq += 1;

		let raw = record.position.as_deref().unwrap_or_default();
		let position = PositionRule::try_parse(raw).unwrap_or_else(|source| {
			self.pending.push(Diagnostic::InvalidPositionSyntax {
				seq,
				contributor_id: record.contributor_id.clone(),
				source,
			});
			PositionRule::Unspecified
		});

		self.fragments.push(Fragment {
			seq,
			feature_name: record.feature_name,
			parent_id: record.parent_id,
			elements: record.elements,
			position,
			contributor_id: record.contributor_id,
			contributor_uri: record.contributor_uri,
			check_exists: record.check_exists,
		});
		seq
	}

	pub fn fragments(&self) -> &[Fragment] {
		&self.fragments
	}

	/// Problems found while building the batch, not yet delivered.
	pub fn diagnostics(&self) -> &[Diagnostic] {
		&self.pending
	}

	pub fn len(&self) -> usize {
		self.fragments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	/// Delivers build-time diagnostics to `sink` and yields the fragments.
	pub(crate) fn drain_into(self, sink: &mut (impl DiagnosticsSink + ?Sized)) -> Vec<Fragment> {
		for diagnostic in self.pending {
			emit(sink, diagnostic);
		}
		self.fragments
	}
}

impl Extend<FragmentRecord> for Batch {
	fn extend<I: IntoIterator<Item = FragmentRecord>>(&mut self, records: I) {
		for record in records {
			self.push(record);
		}
	}
}

impl FromIterator<FragmentRecord> for Batch {
	fn from_iter<I: IntoIterator<Item = FragmentRecord>>(records: I) -> Self {
		Self::from_records(records)
	}
}
