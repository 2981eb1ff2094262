pub mod file;
pub mod memory;

use crate::feed::types::EntryId;
use anyhow::Result;
use async_trait::async_trait;

pub use file::FileTracker;
pub use memory::InMemoryTracker;

/// Record of consumed entries.
///
/// Implementations must keep `track` idempotent: recording an id twice leaves
/// the state as if it had been recorded once.
#[async_trait]
pub trait EntryTracker: Send + Sync {
    async fn is_tracked(&self, id: &EntryId) -> bool;
    async fn track(&self, id: &EntryId) -> Result<()>;
}
