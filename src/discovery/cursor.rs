use super::filter::is_new;
use crate::error::DiscoveryError;
use crate::feed::types::{EarliestEntryLimit, EntryId, PageRef};
use crate::feed::{PageFetcher, PageParser};
use crate::store::EntryTracker;

enum Position {
    Start,
    Next(PageRef),
    Done,
}

/// Walks the feed newest page first, yielding the new entry ids of each page.
///
/// The cursor only moves on to the next page when every entry of the current
/// page was new. One old entry means everything older has been seen already,
/// so the rest of the feed is skipped.
pub struct PageCursor<'a> {
    fetcher: &'a dyn PageFetcher,
    parser: &'a dyn PageParser,
    tracker: &'a dyn EntryTracker,
    limit: Option<&'a EarliestEntryLimit>,
    position: Position,
    pages_read: usize,
}

impl<'a> PageCursor<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        parser: &'a dyn PageParser,
        tracker: &'a dyn EntryTracker,
        limit: Option<&'a EarliestEntryLimit>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            tracker,
            limit,
            position: Position::Start,
            pages_read: 0,
        }
    }

    pub fn pages_read(&self) -> usize {
        self.pages_read
    }

    /// New entry ids of the next page, newest first. `None` once traversal is over.
    ///
    /// Errors are fatal: the cursor is left `Done`.
    pub async fn next_page(&mut self) -> Result<Option<Vec<EntryId>>, DiscoveryError> {
        let (name, raw) = match std::mem::replace(&mut self.position, Position::Done) {
            Position::Done => return Ok(None),
            Position::Start => {
                let name = self.fetcher.describe_initial();
                let raw = self.fetcher.fetch_initial().await;
                (name, raw)
            }
            Position::Next(page) => {
                let raw = self.fetcher.fetch(&page).await;
                (page.to_string(), raw)
            }
        };

        let raw = raw.map_err(|source| DiscoveryError::Fetch {
            page: name.clone(),
            source,
        })?;
        let page = self
            .parser
            .parse(&raw)
            .map_err(|source| DiscoveryError::Parse {
                page: name.clone(),
                source,
            })?;
        self.pages_read += 1;

        tracing::info!(
            page = %page.self_ref.as_ref().map_or(name.as_str(), |r| r.href()),
            "reading feed page"
        );

        let mut fresh = Vec::with_capacity(page.entries.len());
        for entry in &page.entries {
            let fresh_entry = is_new(entry, self.limit, self.tracker)
                .await
                .map_err(|source| DiscoveryError::Parse {
                    page: name.clone(),
                    source,
                })?;
            if fresh_entry {
                fresh.push(entry.id.clone());
            }
        }

        tracing::debug!(
            new = fresh.len(),
            total = page.entries.len(),
            "found new entries on page"
        );

        if fresh.len() == page.entries.len() {
            if let Some(next) = page.next {
                tracing::debug!(next = %next, "every entry was new, continuing");
                self.position = Position::Next(next);
            }
        }

        Ok(Some(fresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::{Entry, Page};
    use crate::store::InMemoryTracker;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves pages keyed by href; the initial page is keyed "".
    struct StubFeed {
        pages: HashMap<String, Page>,
        requested: Mutex<Vec<String>>,
    }

    impl StubFeed {
        fn new(pages: Vec<(&str, Page)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(k, p)| (k.to_string(), p))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }

        fn serve(&self, key: &str) -> Result<String> {
            self.requested.lock().unwrap().push(key.to_string());
            anyhow::ensure!(self.pages.contains_key(key), "404 {}", key);
            Ok(key.to_string())
        }
    }

    #[async_trait]
    impl PageFetcher for StubFeed {
        async fn fetch_initial(&self) -> Result<String> {
            self.serve("")
        }

        async fn fetch(&self, page: &PageRef) -> Result<String> {
            self.serve(page.href())
        }
    }

    impl PageParser for StubFeed {
        fn parse(&self, raw: &str) -> Result<Page> {
            Ok(self.pages[raw].clone())
        }
    }

    fn page(ids: &[(&str, u32)], next: Option<&str>) -> Page {
        Page {
            self_ref: None,
            entries: ids
                .iter()
                .map(|(id, minute)| Entry {
                    id: EntryId::new(*id),
                    published: Some(Utc.with_ymd_and_hms(2026, 10, 18, 12, *minute, 0).unwrap()),
                })
                .collect(),
            next: next.map(PageRef::new),
        }
    }

    fn ids(raw: &[&str]) -> Vec<EntryId> {
        raw.iter().map(|s| EntryId::new(*s)).collect()
    }

    #[tokio::test]
    async fn test_follows_next_while_every_entry_is_new() {
        let feed = StubFeed::new(vec![
            ("", page(&[("4", 40), ("3", 30)], Some("p2"))),
            ("p2", page(&[("2", 20), ("1", 10)], None)),
        ]);
        let tracker = InMemoryTracker::new();
        let mut cursor = PageCursor::new(&feed, &feed, &tracker, None);

        assert_eq!(cursor.next_page().await.unwrap(), Some(ids(&["4", "3"])));
        assert_eq!(cursor.next_page().await.unwrap(), Some(ids(&["2", "1"])));
        assert_eq!(cursor.next_page().await.unwrap(), None);
        assert_eq!(cursor.pages_read(), 2);
        assert_eq!(feed.requested(), vec!["", "p2"]);
    }

    #[tokio::test]
    async fn test_stops_after_page_with_tracked_entry() {
        let feed = StubFeed::new(vec![
            ("", page(&[("4", 40), ("3", 30)], Some("p2"))),
            ("p2", page(&[("2", 20), ("1", 10)], None)),
        ]);
        let tracker = InMemoryTracker::with_tracked(["3"]);
        let mut cursor = PageCursor::new(&feed, &feed, &tracker, None);

        assert_eq!(cursor.next_page().await.unwrap(), Some(ids(&["4"])));
        assert_eq!(cursor.next_page().await.unwrap(), None);
        assert_eq!(feed.requested(), vec![""]);
    }

    #[tokio::test]
    async fn test_empty_page_continues_to_next() {
        let feed = StubFeed::new(vec![
            ("", page(&[], Some("p2"))),
            ("p2", page(&[("1", 10)], None)),
        ]);
        let tracker = InMemoryTracker::new();
        let mut cursor = PageCursor::new(&feed, &feed, &tracker, None);

        assert_eq!(cursor.next_page().await.unwrap(), Some(vec![]));
        assert_eq!(cursor.next_page().await.unwrap(), Some(ids(&["1"])));
        assert_eq!(cursor.next_page().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_last_page_ends_traversal() {
        let feed = StubFeed::new(vec![("", page(&[], None))]);
        let tracker = InMemoryTracker::new();
        let mut cursor = PageCursor::new(&feed, &feed, &tracker, None);

        assert_eq!(cursor.next_page().await.unwrap(), Some(vec![]));
        assert_eq!(cursor.next_page().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_before_limit_stops_traversal() {
        let feed = StubFeed::new(vec![
            ("", page(&[("4", 40), ("3", 30)], Some("p2"))),
            ("p2", page(&[("2", 20)], None)),
        ]);
        let tracker = InMemoryTracker::new();
        let limit = EarliestEntryLimit::new(Utc.with_ymd_and_hms(2026, 10, 18, 12, 30, 0).unwrap());
        let mut cursor = PageCursor::new(&feed, &feed, &tracker, Some(&limit));

        assert_eq!(cursor.next_page().await.unwrap(), Some(ids(&["4"])));
        assert_eq!(cursor.next_page().await.unwrap(), None);
        assert_eq!(feed.requested(), vec![""]);
    }

    #[tokio::test]
    async fn test_fetch_error_names_the_page() {
        let feed = StubFeed::new(vec![("", page(&[("4", 40)], Some("missing")))]);
        let tracker = InMemoryTracker::new();
        let mut cursor = PageCursor::new(&feed, &feed, &tracker, None);

        cursor.next_page().await.unwrap();
        let err = cursor.next_page().await.unwrap_err();
        match err {
            DiscoveryError::Fetch { ref page, .. } => assert_eq!(page, "missing"),
            other => panic!("expected fetch error, got {:?}", other),
        }
        assert_eq!(cursor.next_page().await.unwrap(), None);
    }
}
