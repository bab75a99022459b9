//! Composite tree model for fragment assembly.
//!
//! A tree is a plain owned [`Node`] hierarchy. Each node exposes any number of named,
//! independently ordered child lists ("features"). Fragments contributed by extensions are
//! spliced into these lists by `trellis-merge`; this crate only provides the data model and
//! the whole-tree lookups the merge relies on.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Node`] | An element of the tree with an optional id and per-feature children. |
//! | [`FeatureSchema`] | Which features a node kind may expose. |
//! | [`ContributorTable`] | Side-table recording which contributor introduced an element. |
//!
//! # Invariants
//!
//! - Lookup by id returns the first match in depth-first pre-order (node, then features in
//!   declaration order, then children in list order). Duplicate ids are tolerated.
//! - No process-wide state: trees and side-tables are owned by the caller.

/// Contributor attribution side-table and contribution removal.
pub mod attribution;
/// Whole-tree id lookups.
pub mod lookup;
/// Tree node type and builders.
pub mod node;
/// Feature support per node kind.
pub mod schema;

pub use attribution::{Attribution, ContributorTable, remove_contributions};
pub use lookup::{contains_id, count_nodes, find_by_id, find_by_id_mut, find_feature, position_in};
pub use node::Node;
pub use schema::FeatureSchema;
