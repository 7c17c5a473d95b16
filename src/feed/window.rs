//! Bounded rolling window of the video ids shown in the feed.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::store::FeedStore;
use crate::Result;

/// Ordered, bounded id buffer. Oldest ids sit at the head and are evicted first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingFeedWindow {
    capacity: usize,
    ids: VecDeque<String>,
}

impl RollingFeedWindow {
    /// Create an empty window. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            ids: VecDeque::with_capacity(capacity),
        }
    }

    /// Build a window from a stored sequence, keeping its most recent `capacity` ids.
    pub fn from_ids(capacity: usize, ids: impl IntoIterator<Item = String>) -> Self {
        let mut window = Self::new(capacity);
        for id in ids {
            window.ids.push_back(id);
            if window.ids.len() > window.capacity {
                window.ids.pop_front();
            }
        }
        window
    }

    /// Append ids at the tail in the given order, evicting from the head.
    ///
    /// Ids already in the window are not added again. Returns the evicted ids.
    pub fn append<I>(&mut self, new_ids: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut present: HashSet<String> = self.ids.iter().cloned().collect();
        let mut evicted = Vec::new();

        for id in new_ids {
            let id = id.into();
            if !present.insert(id.clone()) {
                continue;
            }
            self.ids.push_back(id);
            while self.ids.len() > self.capacity {
                if let Some(old) = self.ids.pop_front() {
                    present.remove(&old);
                    evicted.push(old);
                }
            }
        }
        evicted
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Load the persisted window, or an empty one if none was saved yet.
    pub async fn load(store: &dyn FeedStore, capacity: usize) -> Result<Self> {
        let stored = store.load_window().await?.unwrap_or_default();
        if stored.len() > capacity {
            debug!(
                "Stored window holds {} ids, keeping the newest {}",
                stored.len(),
                capacity
            );
        }
        Ok(Self::from_ids(capacity, stored))
    }

    /// Overwrite the persisted window with the current contents.
    pub async fn persist(&self, store: &dyn FeedStore) -> Result<()> {
        store.save_window(&self.ids()).await
    }
}
