use super::EntryTracker;
use crate::feed::types::EntryId;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
struct Tracked {
    ids: HashSet<EntryId>,
    order: Vec<EntryId>,
}

/// Process-local tracker. Remembers the order ids were first recorded in.
#[derive(Default)]
pub struct InMemoryTracker {
    inner: Mutex<Tracked>,
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracked<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntryId>,
    {
        let tracker = Self::new();
        {
            let mut inner = tracker.lock();
            for id in ids {
                let id = id.into();
                if inner.ids.insert(id.clone()) {
                    inner.order.push(id);
                }
            }
        }
        tracker
    }

    /// Ids in the order they were first recorded.
    pub fn tracked_in_order(&self) -> Vec<EntryId> {
        self.lock().order.clone()
    }

    pub fn count(&self) -> usize {
        self.lock().ids.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tracked> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl EntryTracker for InMemoryTracker {
    async fn is_tracked(&self, id: &EntryId) -> bool {
        self.lock().ids.contains(id)
    }

    async fn track(&self, id: &EntryId) -> Result<()> {
        let mut inner = self.lock();
        if inner.ids.insert(id.clone()) {
            inner.order.push(id.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_tracker_is_empty() {
        let tracker = InMemoryTracker::new();
        assert_eq!(tracker.count(), 0);
        assert!(!tracker.is_tracked(&EntryId::new("1")).await);
    }

    #[tokio::test]
    async fn test_track_is_idempotent() {
        let tracker = InMemoryTracker::new();
        tracker.track(&EntryId::new("1")).await.unwrap();
        tracker.track(&EntryId::new("2")).await.unwrap();
        tracker.track(&EntryId::new("1")).await.unwrap();

        assert_eq!(tracker.count(), 2);
        assert!(tracker.is_tracked(&EntryId::new("1")).await);
        assert_eq!(
            tracker.tracked_in_order(),
            vec![EntryId::new("1"), EntryId::new("2")]
        );
    }

    #[tokio::test]
    async fn test_seeded_tracker() {
        let tracker = InMemoryTracker::with_tracked(["a", "b", "a"]);
        assert_eq!(tracker.count(), 2);
        assert!(tracker.is_tracked(&EntryId::new("b")).await);
    }
}
