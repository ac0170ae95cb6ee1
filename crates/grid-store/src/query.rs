//! Query types: sort spec, filter matching and fetch queries

use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Default display / sort field
pub const DEFAULT_DISPLAY_FIELD: &str = "Name";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest first
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Ascending,
    /// Largest first
    #[serde(rename = "DESC", alias = "desc")]
    Descending,
}

impl SortDirection {
    /// Wire keyword
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    /// Orient an ascending comparison result
    #[inline]
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown sort direction keyword
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort direction: {0}")]
pub struct ParseDirectionError(pub String);

impl FromStr for SortDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Field and direction to order records by
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field name
    pub field: String,
    /// Direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    /// Create sort spec
    #[inline]
    #[must_use]
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending on field
    #[inline]
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    /// Descending on field
    #[inline]
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// Compare two records under this spec
    #[inline]
    #[must_use]
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.direction.apply(a.compare_on(b, &self.field))
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::ascending(DEFAULT_DISPLAY_FIELD)
    }
}

/// Case handling for substring filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Exact substring match
    #[default]
    CaseSensitive,
    /// Substring match ignoring case
    CaseInsensitive,
}

impl MatchMode {
    /// Whether `haystack` contains `needle` under this mode.
    ///
    /// The empty needle matches everything.
    #[must_use]
    pub fn contains(self, haystack: &str, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        match self {
            Self::CaseSensitive => haystack.contains(needle),
            Self::CaseInsensitive => haystack.to_lowercase().contains(&needle.to_lowercase()),
        }
    }

    /// Whether a record's display field matches the filter text.
    ///
    /// Records without the display field only match the empty filter.
    #[must_use]
    pub fn matches(self, record: &Record, display_field: &str, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        record
            .text_of(display_field)
            .is_some_and(|text| self.contains(&text, filter))
    }
}

/// Parameters of a store fetch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchQuery {
    /// Substring the display field must contain (empty = all)
    pub filter: String,
    /// Ordering of the result
    pub sort: SortSpec,
}

impl FetchQuery {
    /// Create query
    #[inline]
    #[must_use]
    pub fn new(filter: impl Into<String>, sort: SortSpec) -> Self {
        Self {
            filter: filter.into(),
            sort,
        }
    }
}
