//! Non-fatal merge reports.
//!
//! Every degradation the engine applies (dropping a fragment, appending instead of placing,
//! skipping a duplicate) is described by a [`Diagnostic`], logged through `tracing` and
//! delivered to the caller's [`DiagnosticsSink`].

use thiserror::Error;
use tracing::{info, warn};

use crate::position::PositionSyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
	Info,
	Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
	ParentNotFound,
	AnchorNotFound,
	InvalidPositionSyntax,
	DuplicateElementSkipped,
	FeatureUnsupported,
	ContributorCycle,
}

/// A recoverable condition met while building or merging a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
	/// The fragment's parent does not exist; the fragment was dropped.
	#[error("fragment {seq} from `{contributor_id}`: parent `{parent_id}` not found, fragment dropped")]
	ParentNotFound {
		seq: u32,
		contributor_id: String,
		parent_id: String,
	},
	/// The anchor is not in the target list; the elements were appended.
	#[error(
		"fragment {seq} from `{contributor_id}`: anchor `{anchor}` not in `{parent_id}/{feature_name}`{}, appended",
		elsewhere_note(.elsewhere)
	)]
	AnchorNotFound {
		seq: u32,
		contributor_id: String,
		parent_id: String,
		feature_name: String,
		anchor: String,
		/// The anchor exists under another parent or feature.
		elsewhere: bool,
	},
	/// The raw position was malformed and treated as unspecified.
	#[error("fragment {seq} from `{contributor_id}`: {source}, appending")]
	InvalidPositionSyntax {
		seq: u32,
		contributor_id: String,
		#[source]
		source: PositionSyntaxError,
	},
	/// An element already present in the tree was not inserted again.
	#[error("fragment {seq} from `{contributor_id}`: element `{element_id}` already exists, skipped")]
	DuplicateElementSkipped {
		seq: u32,
		contributor_id: String,
		element_id: String,
	},
	/// The parent's kind does not support the feature; the fragment was dropped.
	#[error(
		"fragment {seq} from `{contributor_id}`: `{parent_id}` does not support feature `{feature_name}`, fragment dropped"
	)]
	FeatureUnsupported {
		seq: u32,
		contributor_id: String,
		parent_id: String,
		feature_name: String,
	},
	/// Contributors require each other; they keep encounter order.
	#[error("contributor requirement cycle: {}", .members.join(" -> "))]
	ContributorCycle { members: Vec<String> },
}

fn elsewhere_note(elsewhere: &bool) -> &'static str {
	if *elsewhere {
		" (present elsewhere in the tree)"
	} else {
		""
	}
}

impl Diagnostic {
	pub fn kind(&self) -> DiagnosticKind {
		match self {
			Self::ParentNotFound { .. } => DiagnosticKind::ParentNotFound,
			Self::AnchorNotFound { .. } => DiagnosticKind::AnchorNotFound,
			Self::InvalidPositionSyntax { .. } => DiagnosticKind::InvalidPositionSyntax,
			Self::DuplicateElementSkipped { .. } => DiagnosticKind::DuplicateElementSkipped,
			Self::FeatureUnsupported { .. } => DiagnosticKind::FeatureUnsupported,
			Self::ContributorCycle { .. } => DiagnosticKind::ContributorCycle,
		}
	}

	pub fn severity(&self) -> Severity {
		match self.kind() {
			DiagnosticKind::DuplicateElementSkipped | DiagnosticKind::ContributorCycle => {
				Severity::Info
			}
			_ => Severity::Warning,
		}
	}

	/// Sequence number of the fragment concerned, if any.
	pub fn seq(&self) -> Option<u32> {
		match self {
			Self::ParentNotFound { seq, .. }
			| Self::AnchorNotFound { seq, .. }
			| Self::InvalidPositionSyntax { seq, .. }
			| Self::DuplicateElementSkipped { seq, .. }
			| Self::FeatureUnsupported { seq, .. } => Some(*seq),
			Self::ContributorCycle { .. } => None,
		}
	}
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagnosticsSink {
	fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticsSink for Vec<Diagnostic> {
	fn report(&mut self, diagnostic: Diagnostic) {
		self.push(diagnostic);
	}
}

/// Discards reports. Diagnostics are still logged.
impl DiagnosticsSink for () {
	fn report(&mut self, _diagnostic: Diagnostic) {}
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for &mut S {
	fn report(&mut self, diagnostic: Diagnostic) {
		(**self).report(diagnostic);
	}
}

/// Logs `diagnostic` and hands it to `sink`.
pub(crate) fn emit(sink: &mut (impl DiagnosticsSink + ?Sized), diagnostic: Diagnostic) {
	match diagnostic.severity() {
		Severity::Warning => warn!(kind = ?diagnostic.kind(), seq = ?diagnostic.seq(), "{diagnostic}"),
		Severity::Info => info!(kind = ?diagnostic.kind(), seq = ?diagnostic.seq(), "{diagnostic}"),
	}
	sink.report(diagnostic);
}
