use crate::feed::types::{EarliestEntryLimit, Entry};
use crate::store::EntryTracker;
use anyhow::Result;

/// An entry is new when it is inside the cutoff window and not yet tracked.
/// The tracker is only consulted for entries the cutoff admits.
///
/// With a cutoff configured, an entry without a publish time cannot be placed
/// and is an error.
pub async fn is_new(
    entry: &Entry,
    limit: Option<&EarliestEntryLimit>,
    tracker: &dyn EntryTracker,
) -> Result<bool> {
    let in_window = match limit {
        None => true,
        Some(l) => {
            let published = entry.published.ok_or_else(|| {
                anyhow::anyhow!("entry {} has no usable _published", entry.id)
            })?;
            l.admits(published)
        }
    };
    Ok(in_window && !tracker.is_tracked(&entry.id).await)
}
