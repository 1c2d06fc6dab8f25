//! Filter, sort and pagination state of a list view
//!
//! [`FilterState`] is the single value every other component reads: the codec
//! turns it into route parameters, the engine turns it into a server request,
//! and the seed controller keeps its random seed stable.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TagId;
use crate::seed::RandomSeed;

/// Unknown wire name for one of the state enums
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseStateError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseStateError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Ordering requested from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Pseudo-random order driven by the current seed
    #[default]
    Random,
    Filename,
    Duration,
    Size,
    /// Newest first
    #[value(name = "created_at")]
    CreatedAt,
}

impl SortMode {
    /// Name used on the wire and in the route
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Filename => "filename",
            Self::Duration => "duration",
            Self::Size => "size",
            Self::CreatedAt => "created_at",
        }
    }

    #[must_use]
    pub const fn is_random(self) -> bool {
        matches!(self, Self::Random)
    }
}

impl FromStr for SortMode {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "filename" => Ok(Self::Filename),
            "duration" => Ok(Self::Duration),
            "size" => Ok(Self::Size),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(ParseStateError::new("sort mode", other)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse duration filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    Short,
    Long,
}

impl DurationBucket {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Long => "long",
        }
    }
}

impl FromStr for DurationBucket {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(Self::Short),
            "long" => Ok(Self::Long),
            other => Err(ParseStateError::new("duration", other)),
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layout of the result page; a pure client preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}

impl FromStr for ViewMode {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(Self::Grid),
            "list" => Ok(Self::List),
            other => Err(ParseStateError::new("view mode", other)),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Complete filter, sort and pagination state of one list view
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub keyword: String,
    pub only_favorites: bool,
    pub tag_ids: BTreeSet<TagId>,
    pub duration: Option<DurationBucket>,
    pub sort: SortMode,
    /// 1-based page index
    pub page: u32,
    pub page_size: u32,
    pub view_mode: ViewMode,
    pub random_seed: RandomSeed,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            only_favorites: false,
            tag_ids: BTreeSet::new(),
            duration: None,
            sort: SortMode::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            view_mode: ViewMode::default(),
            random_seed: RandomSeed::default(),
        }
    }
}

impl FilterState {
    /// Number of items before the current page
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.page_size as u64
    }

    /// Apply a partial filter change
    ///
    /// Returns the sort mode that was active before the change so the caller
    /// can decide whether a new seed is due. Page is left untouched.
    pub fn merge(&mut self, patch: &FilterPatch) -> SortMode {
        let previous = self.sort;
        if let Some(keyword) = &patch.keyword {
            self.keyword.clone_from(keyword);
        }
        if let Some(only_favorites) = patch.only_favorites {
            self.only_favorites = only_favorites;
        }
        if let Some(tag_ids) = &patch.tag_ids {
            self.tag_ids.clone_from(tag_ids);
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(sort) = patch.sort {
            self.sort = sort;
        }
        previous
    }

    /// Whether the engine-owned filter fields equal `other`'s
    ///
    /// Page size, view mode and seed are ignored.
    #[must_use]
    pub fn same_query(&self, other: &Self) -> bool {
        self.keyword == other.keyword
            && self.only_favorites == other.only_favorites
            && self.tag_ids == other.tag_ids
            && self.duration == other.duration
            && self.sort == other.sort
            && self.page == other.page
    }
}

/// Partial change to the filter fields of a [`FilterState`]
///
/// `duration` is doubly optional so a patch can clear the bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub keyword: Option<String>,
    pub only_favorites: Option<bool>,
    pub tag_ids: Option<BTreeSet<TagId>>,
    pub duration: Option<Option<DurationBucket>>,
    pub sort: Option<SortMode>,
}

impl FilterPatch {
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    #[must_use]
    pub const fn only_favorites(mut self, only_favorites: bool) -> Self {
        self.only_favorites = Some(only_favorites);
        self
    }

    #[must_use]
    pub fn tag_ids(mut self, tag_ids: impl IntoIterator<Item = TagId>) -> Self {
        self.tag_ids = Some(tag_ids.into_iter().collect());
        self
    }

    #[must_use]
    pub const fn duration(mut self, duration: Option<DurationBucket>) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub const fn sort(mut self, sort: SortMode) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch that sets every filter field to `state`'s value
    #[must_use]
    pub fn from_state(state: &FilterState) -> Self {
        Self {
            keyword: Some(state.keyword.clone()),
            only_favorites: Some(state.only_favorites),
            tag_ids: Some(state.tag_ids.clone()),
            duration: Some(state.duration),
            sort: Some(state.sort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_mode_wire_names() {
        for mode in [
            SortMode::Random,
            SortMode::Filename,
            SortMode::Duration,
            SortMode::Size,
            SortMode::CreatedAt,
        ] {
            assert_eq!(mode.as_str().parse::<SortMode>(), Ok(mode));
        }
        assert!("newest".parse::<SortMode>().is_err());
    }

    #[test]
    fn test_parse_error_message() {
        let err = "huge".parse::<DurationBucket>().unwrap_err();
        assert_eq!(err.to_string(), "unknown duration 'huge'");
    }

    #[test]
    fn test_skip_from_page() {
        let state = FilterState {
            page: 3,
            page_size: 20,
            ..FilterState::default()
        };
        assert_eq!(state.skip(), 40);
        assert_eq!(FilterState::default().skip(), 0);
    }

    #[test]
    fn test_merge_reports_previous_sort() {
        let mut state = FilterState {
            sort: SortMode::Size,
            page: 4,
            ..FilterState::default()
        };
        let patch = FilterPatch::default()
            .keyword("cats")
            .sort(SortMode::Random)
            .tag_ids([5, 2]);

        let previous = state.merge(&patch);

        assert_eq!(previous, SortMode::Size);
        assert_eq!(state.sort, SortMode::Random);
        assert_eq!(state.keyword, "cats");
        assert_eq!(state.tag_ids.iter().copied().collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(state.page, 4);
    }

    #[test]
    fn test_merge_can_clear_duration() {
        let mut state = FilterState {
            duration: Some(DurationBucket::Long),
            ..FilterState::default()
        };
        state.merge(&FilterPatch::default().duration(None));
        assert_eq!(state.duration, None);

        state.merge(&FilterPatch::default());
        assert_eq!(state.duration, None);
    }
}
