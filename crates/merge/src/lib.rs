//! Fragment ordering and merge engine.
//!
//! Folds independently authored contributions into one composite [`Node`] tree. Each
//! contribution ([`FragmentRecord`]) names a parent id, a feature (child list) of that parent,
//! the elements to insert and a [`PositionRule`]. A [`Batch`] sequences the records, the
//! [`ordering`] pass computes a deterministic processing order, and [`Merger`] splices each
//! fragment into the live tree.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`PositionRule`] | Parsed placement rule of a fragment. |
//! | [`Batch`] | Sequenced fragments of one assembly pass. |
//! | [`OrderKey`] | Total order key of a fragment within its batch. |
//! | [`Merger`] | Applies a batch to a tree under a schema and options. |
//! | [`Diagnostic`] | Non-fatal report of a degraded fragment. |
//!
//! # Invariants
//!
//! - Merging never fails. Missing parents drop the fragment, missing anchors append, and
//!   out-of-range indices clamp.
//! - Elements present before the pass are never removed or moved to another list.
//! - The processing order depends only on fragment contents and sequence numbers.
//! - Each fragment computes its insertion index after every earlier fragment has been spliced.
//!
//! [`Node`]: trellis_model::Node

pub mod apply;
pub mod batch;
pub mod diagnostics;
pub mod fragment;
pub mod ordering;
pub mod position;

pub use apply::{MergeOptions, MergeSummary, Merger, merge};
pub use batch::{Batch, Bundle};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticsSink, Severity};
pub use fragment::{Fragment, FragmentRecord};
pub use ordering::{FragmentOrder, OrderKey};
pub use position::{Category, PositionRule, PositionSyntaxError};
