use crate::feed::types::EntryId;
use thiserror::Error;

/// Why a discovery run stopped.
///
/// `Fetch` and `Parse` happen while scanning, before anything is recorded.
/// `Track` happens while recording; `tracked` ids of the run, the oldest ones,
/// were committed before the failure.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to fetch feed page {page}")]
    Fetch {
        page: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to parse feed page {page}")]
    Parse {
        page: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to track entry {id} after tracking {tracked} entries")]
    Track {
        id: EntryId,
        tracked: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl DiscoveryError {
    /// True when the run failed before any tracking write.
    pub fn is_scan_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Parse { .. })
    }
}
