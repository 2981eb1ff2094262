pub mod cursor;
pub mod filter;

use crate::error::DiscoveryError;
use crate::feed::types::{EarliestEntryLimit, EntryId};
use crate::feed::{PageFetcher, PageParser};
use crate::store::EntryTracker;
use cursor::PageCursor;
use std::sync::Arc;

/// Outcome of a successful `discover_and_track` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_read: usize,
    pub discovered: usize,
    pub tracked: usize,
}

/// Finds entries that have not been consumed yet and tracks them.
pub struct EntryDiscovery {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn PageParser>,
    tracker: Arc<dyn EntryTracker>,
    earliest_entry_limit: Option<EarliestEntryLimit>,
}

impl EntryDiscovery {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        parser: Arc<dyn PageParser>,
        tracker: Arc<dyn EntryTracker>,
        earliest_entry_limit: Option<EarliestEntryLimit>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            tracker,
            earliest_entry_limit,
        }
    }

    /// Scan the feed and return the new entry ids, oldest first. Writes nothing.
    pub async fn discover(&self) -> Result<Vec<EntryId>, DiscoveryError> {
        self.scan().await.map(|(ids, _)| ids)
    }

    /// Scan the whole feed, then track every new entry, oldest first.
    ///
    /// The scan completes before the first write, so a fetch or parse failure
    /// leaves the tracker untouched. Writing oldest first means a failed write
    /// leaves the tracked set a chronological prefix of the feed.
    pub async fn discover_and_track(&self) -> Result<RunSummary, DiscoveryError> {
        let (ids, pages_read) = self.scan().await?;
        let discovered = ids.len();

        for (tracked, id) in ids.into_iter().enumerate() {
            if let Err(source) = self.tracker.track(&id).await {
                return Err(DiscoveryError::Track {
                    id,
                    tracked,
                    source,
                });
            }
            tracing::debug!(entry = %id, "tracked entry");
        }

        let summary = RunSummary {
            pages_read,
            discovered,
            tracked: discovered,
        };
        tracing::info!(
            pages = summary.pages_read,
            tracked = summary.tracked,
            "discovery run complete"
        );
        Ok(summary)
    }

    async fn scan(&self) -> Result<(Vec<EntryId>, usize), DiscoveryError> {
        let mut cursor = PageCursor::new(
            self.fetcher.as_ref(),
            self.parser.as_ref(),
            self.tracker.as_ref(),
            self.earliest_entry_limit.as_ref(),
        );

        let mut pages = Vec::new();
        while let Some(ids) = cursor.next_page().await? {
            pages.push(ids);
        }

        let mut ids: Vec<EntryId> = pages.into_iter().flatten().collect();
        ids.reverse();
        Ok((ids, cursor.pages_read()))
    }
}
