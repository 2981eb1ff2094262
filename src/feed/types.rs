use chrono::{DateTime, Utc};
use std::fmt;

/// Feed-unique entry identifier, used as the tracking key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque reference to a feed page (an href).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef(String);

impl PageRef {
    pub fn new(href: impl Into<String>) -> Self {
        Self(href.into())
    }

    pub fn href(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    /// `None` when the feed gave no usable publish time. Only needed when a
    /// cutoff is configured.
    pub published: Option<DateTime<Utc>>,
}

/// One page of the feed. Entries are newest-first, `next` points at older entries.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub self_ref: Option<PageRef>,
    pub entries: Vec<Entry>,
    pub next: Option<PageRef>,
}

/// Entries published at or before this instant are never discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarliestEntryLimit(DateTime<Utc>);

impl EarliestEntryLimit {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.0
    }

    /// True when `published` is strictly after the limit.
    pub fn admits(&self, published: DateTime<Utc>) -> bool {
        published > self.0
    }
}
