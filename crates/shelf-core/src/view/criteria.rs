//! Filter and sort pass: turns the collection into an ordered view.

use crate::{Error, Item, Result, Status};
use std::collections::BTreeSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn admits(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => s == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    pub fn admits(&self, tags: &[String]) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Tag(tag) => tags.iter().any(|t| t == tag),
        }
    }
}

impl From<&str> for TagFilter {
    fn from(s: &str) -> Self {
        if s == "all" {
            TagFilter::All
        } else {
            TagFilter::Tag(s.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            other => Err(Error::Validation(format!("unknown sort order '{other}'"))),
        }
    }
}

/// Inputs of one filter pass. Changing any field means a new pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewCriteria {
    pub search_term: String,
    pub status: StatusFilter,
    pub tag: TagFilter,
    pub sort: SortOrder,
}

impl ViewCriteria {
    pub fn with_search<S: Into<String>>(mut self, term: S) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_tag(mut self, tag: TagFilter) -> Self {
        self.tag = tag;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Trimmed, case-folded search term; `None` when there is nothing to match.
    pub fn needle(&self) -> Option<String> {
        let t = self.search_term.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_lowercase())
        }
    }
}

/// Whether `item` passes every active clause of `criteria`.
pub fn matches(item: &Item, criteria: &ViewCriteria) -> bool {
    matches_with(item, criteria, criteria.needle().as_deref())
}

fn matches_with(item: &Item, criteria: &ViewCriteria, needle: Option<&str>) -> bool {
    if !criteria.status.admits(item.status) {
        return false;
    }
    if !criteria.tag.admits(&item.tags) {
        return false;
    }
    if let Some(needle) = needle {
        let haystack = format!(
            "{} {} {} {}",
            item.text,
            item.author,
            item.note,
            item.tags.join(" ")
        )
        .to_lowercase();
        if !haystack.contains(needle) {
            return false;
        }
    }
    true
}

/// Positions into `items` of every matching item, in sort order.
///
/// Pure: `items` is not touched, and equal inputs give equal output (the sort
/// is stable, so equal timestamps keep collection order).
pub fn apply(items: &[Item], criteria: &ViewCriteria) -> Vec<usize> {
    let needle = criteria.needle();
    let mut view: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| matches_with(item, criteria, needle.as_deref()))
        .map(|(i, _)| i)
        .collect();
    match criteria.sort {
        SortOrder::Newest => view.sort_by(|&a, &b| items[b].saved_at.cmp(&items[a].saved_at)),
        SortOrder::Oldest => view.sort_by_key(|&i| items[i].saved_at),
    }
    view
}

/// Sorted, de-duplicated tags across the collection.
pub fn available_tags(items: &[Item]) -> Vec<String> {
    items
        .iter()
        .flat_map(|i| i.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_filters() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Archived".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(Status::Archived)
        );
        assert!("bogus".parse::<StatusFilter>().is_err());
        assert_eq!(TagFilter::from("all"), TagFilter::All);
        assert_eq!(TagFilter::from("rust"), TagFilter::Tag("rust".into()));
        assert_eq!("oldest".parse::<SortOrder>().unwrap(), SortOrder::Oldest);
    }

    #[test]
    fn blank_search_has_no_needle() {
        assert_eq!(ViewCriteria::default().with_search("   ").needle(), None);
        assert_eq!(
            ViewCriteria::default().with_search("  FoO ").needle().as_deref(),
            Some("foo")
        );
    }
}
