use serde::{Deserialize, Serialize};
use trellis_model::{Attribution, Node};

use crate::position::{Category, PositionRule};

/// A contribution as discovered, before it joins a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRecord {
	/// Feature of the parent that receives the elements.
	#[serde(rename = "feature")]
	pub feature_name: String,
	/// Id of the node to attach under.
	#[serde(rename = "parent")]
	pub parent_id: String,
	#[serde(default)]
	pub elements: Vec<Node>,
	/// Raw position string, parsed when the record joins a batch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<String>,
	#[serde(default)]
	pub contributor_id: String,
	#[serde(default)]
	pub contributor_uri: String,
	/// Skip elements whose id already exists anywhere in the tree.
	#[serde(default)]
	pub check_exists: bool,
}

impl FragmentRecord {
	pub fn new(parent_id: impl Into<String>, feature_name: impl Into<String>) -> Self {
		Self {
			parent_id: parent_id.into(),
			feature_name: feature_name.into(),
			..Self::default()
		}
	}

	pub fn with_elements(mut self, elements: Vec<Node>) -> Self {
		self.elements = elements;
		self
	}

	pub fn with_position(mut self, position: impl Into<String>) -> Self {
		self.position = Some(position.into());
		self
	}

	pub fn with_contributor(mut self, id: impl Into<String>, uri: impl Into<String>) -> Self {
		self.contributor_id = id.into();
		self.contributor_uri = uri.into();
		self
	}

	pub fn with_check_exists(mut self, check_exists: bool) -> Self {
		self.check_exists = check_exists;
		self
	}
}

/// A sequenced contribution awaiting merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
	/// Encounter sequence number within the batch.
	pub seq: u32,
	pub feature_name: String,
	pub parent_id: String,
	pub elements: Vec<Node>,
	pub position: PositionRule,
	pub contributor_id: String,
	pub contributor_uri: String,
	pub check_exists: bool,
}

impl Fragment {
	#[inline]
	pub fn category(&self) -> Category {
		self.position.category()
	}

	/// Ids of the top-level elements this fragment inserts.
	pub fn provided_ids(&self) -> impl Iterator<Item = &str> {
		self.elements.iter().filter_map(Node::id)
	}

	/// Returns true if one of the top-level elements carries `id`.
	pub fn provides(&self, id: &str) -> bool {
		self.elements.iter().any(|e| e.has_id(id))
	}

	pub fn attribution(&self) -> Attribution {
		Attribution {
			contributor_id: self.contributor_id.clone(),
			contributor_uri: self.contributor_uri.clone(),
			seq: self.seq,
		}
	}
}
