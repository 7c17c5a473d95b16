//! Batched lookup of full video metadata.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::pagination::{fetch_all, PageRequest, PageSource};
use super::types::VideoItem;
use crate::config::{YoutubeConfig, MAX_API_PAGE_SIZE};
use crate::{Result, TubefeedError};

/// Resolves video ids to [`VideoItem`]s in fixed-size batches.
#[derive(Debug, Clone)]
pub struct VideoInfoResolver {
    batch_size: usize,
    parts: Vec<String>,
    fail_on_count_mismatch: bool,
}

impl VideoInfoResolver {
    /// Create a resolver requesting `parts` for up to `batch_size` ids per call.
    pub fn new(batch_size: usize, parts: Vec<String>) -> Self {
        Self {
            batch_size: batch_size.clamp(1, MAX_API_PAGE_SIZE as usize),
            parts,
            fail_on_count_mismatch: false,
        }
    }

    pub fn from_config(config: &YoutubeConfig) -> Self {
        Self::new(config.video_batch_size, config.video_parts.clone())
            .with_fail_on_count_mismatch(config.fail_on_count_mismatch)
    }

    /// Treat a short batch as an error instead of a logged discrepancy.
    pub fn with_fail_on_count_mismatch(mut self, fail: bool) -> Self {
        self.fail_on_count_mismatch = fail;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Request for one batch of ids.
    pub fn batch_request(&self, ids: &[String]) -> PageRequest {
        PageRequest::new("videos")
            .param("part", self.parts.join(","))
            .param("id", ids.join(","))
    }

    /// Fetch metadata for `ids`.
    ///
    /// Duplicate ids are requested once. Batches keep the input order. When a
    /// batch resolves fewer videos than requested, the missing ids are logged
    /// and skipped, or the call fails with [`TubefeedError::CountMismatch`] if
    /// configured to.
    pub async fn resolve(&self, source: &dyn PageSource, ids: &[String]) -> Result<Vec<VideoItem>> {
        let mut unique: Vec<String> = Vec::with_capacity(ids.len());
        let mut seen: HashSet<&str> = HashSet::new();
        for id in ids {
            if seen.insert(id.as_str()) {
                unique.push(id.clone());
            }
        }

        let mut resolved: Vec<VideoItem> = Vec::with_capacity(unique.len());
        let mut resolved_ids: HashSet<String> = HashSet::new();

        for batch in unique.chunks(self.batch_size) {
            let items: Vec<VideoItem> = fetch_all(source, self.batch_request(batch)).await?;

            let requested: HashSet<&str> = batch.iter().map(String::as_str).collect();
            let mut matched = 0usize;
            for item in items {
                if !requested.contains(item.id.as_str()) {
                    warn!("Ignoring unrequested video {} in batch response", item.id);
                    continue;
                }
                if resolved_ids.insert(item.id.clone()) {
                    matched += 1;
                    resolved.push(item);
                }
            }

            if matched != batch.len() {
                if self.fail_on_count_mismatch {
                    return Err(TubefeedError::CountMismatch {
                        requested: batch.len(),
                        resolved: matched,
                    });
                }
                let missing: Vec<&str> = batch
                    .iter()
                    .map(String::as_str)
                    .filter(|id| !resolved_ids.contains(*id))
                    .collect();
                warn!(
                    "Resolved {} of {} requested videos, missing: {}",
                    matched,
                    batch.len(),
                    missing.join(",")
                );
            }
        }

        debug!(
            "Resolved {} video(s) in {} batch(es)",
            resolved.len(),
            unique.len().div_ceil(self.batch_size)
        );
        Ok(resolved)
    }
}
