use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

const INDEX_PREFIX: &str = "index:";
const BEFORE_PREFIX: &str = "before:";
const AFTER_PREFIX: &str = "after:";

/// Where a fragment's elements go within the target child list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PositionRule {
	/// Append at the end.
	#[default]
	Unspecified,
	/// Insert at the head of the list.
	First,
	/// Append at the end, after positionless fragments settled.
	Last,
	/// Insert at an absolute index, clamped into the list bounds.
	Index(i64),
	/// Insert directly before the element with this id.
	Before(String),
	/// Insert directly after the element with this id.
	After(String),
}

/// Coarse grouping of [`PositionRule`]s, declared in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
	Index,
	Unspecified,
	First,
	Last,
	After,
	Before,
}

impl Category {
	/// All categories in processing order.
	pub const ALL: [Category; 6] = [
		Category::Index,
		Category::Unspecified,
		Category::First,
		Category::Last,
		Category::After,
		Category::Before,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			Category::Index => "index",
			Category::Unspecified => "unspecified",
			Category::First => "first",
			Category::Last => "last",
			Category::After => "after",
			Category::Before => "before",
		}
	}

	/// Returns true for categories whose rules name an anchor.
	pub const fn is_relative(self) -> bool {
		matches!(self, Category::After | Category::Before)
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.pad(self.as_str())
	}
}

/// Why a raw position string did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionSyntaxError {
	#[error("unrecognized position `{0}`")]
	Unrecognized(String),
	#[error("invalid index in position `{raw}`")]
	InvalidIndex {
		raw: String,
		#[source]
		source: ParseIntError,
	},
	#[error("missing anchor id in position `{0}`")]
	MissingAnchor(String),
}

impl PositionRule {
	/// Parses an optional raw position, degrading anything malformed to
	/// [`PositionRule::Unspecified`].
	pub fn parse(raw: Option<&str>) -> Self {
		raw.and_then(|raw| Self::try_parse(raw).ok())
			.unwrap_or_default()
	}

	/// Parses a raw position, reporting malformed input.
	///
	/// The empty string is [`PositionRule::Unspecified`], not an error.
	pub fn try_parse(raw: &str) -> Result<Self, PositionSyntaxError> {
		match raw {
			"" => return Ok(Self::Unspecified),
			"first" => return Ok(Self::First),
			"last" => return Ok(Self::Last),
			_ => {}
		}

		if let Some(value) = raw.strip_prefix(INDEX_PREFIX) {
			return value
				.parse::<i64>()
				.map(Self::Index)
				.map_err(|source| PositionSyntaxError::InvalidIndex {
					raw: raw.to_string(),
					source,
				});
		}

		let anchored = |anchor: &str, make: fn(String) -> Self| {
			if anchor.is_empty() {
				Err(PositionSyntaxError::MissingAnchor(raw.to_string()))
			} else {
				Ok(make(anchor.to_string()))
			}
		};
		if let Some(anchor) = raw.strip_prefix(BEFORE_PREFIX) {
			return anchored(anchor, Self::Before);
		}
		if let Some(anchor) = raw.strip_prefix(AFTER_PREFIX) {
			return anchored(anchor, Self::After);
		}

		Err(PositionSyntaxError::Unrecognized(raw.to_string()))
	}

	pub fn category(&self) -> Category {
		match self {
			Self::Unspecified => Category::Unspecified,
			Self::First => Category::First,
			Self::Last => Category::Last,
			Self::Index(_) => Category::Index,
			Self::Before(_) => Category::Before,
			Self::After(_) => Category::After,
		}
	}

	/// Returns the anchor id of a `Before`/`After` rule.
	pub fn anchor(&self) -> Option<&str> {
		match self {
			Self::Before(anchor) | Self::After(anchor) => Some(anchor),
			_ => None,
		}
	}

	/// Computes the insertion index into a list of `len` elements.
	///
	/// `anchor_at` is the position of the anchor in that same list, if present. A relative rule
	/// whose anchor is absent appends.
	pub fn insertion_index(&self, len: usize, anchor_at: Option<usize>) -> usize {
		match self {
			Self::Unspecified | Self::Last => len,
			Self::First => 0,
			Self::Index(n) => usize::try_from((*n).max(0)).map_or(len, |n| n.min(len)),
			Self::Before(_) => anchor_at.unwrap_or(len),
			Self::After(_) => anchor_at.map_or(len, |p| p + 1),
		}
	}
}

impl FromStr for PositionRule {
	type Err = PositionSyntaxError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::try_parse(s)
	}
}

impl fmt::Display for PositionRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unspecified => Ok(()),
			Self::First => f.write_str("first"),
			Self::Last => f.write_str("last"),
			Self::Index(n) => write!(f, "{INDEX_PREFIX}{n}"),
			Self::Before(anchor) => write!(f, "{BEFORE_PREFIX}{anchor}"),
			Self::After(anchor) => write!(f, "{AFTER_PREFIX}{anchor}"),
		}
	}
}
