//! New video detection across all subscribed channels.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, warn};

use super::poller::ChannelFeed;
use crate::error::RequestError;
use crate::store::FeedStore;
use crate::{Result, TubefeedError};

/// A channel whose feed could not be fetched this cycle.
#[derive(Debug)]
pub struct ChannelFailure {
    pub channel_id: String,
    pub error: RequestError,
}

/// Result of diffing a set of channels.
#[derive(Debug, Default)]
pub struct DiffOutcome {
    /// Ids not yet known for their channel, without duplicates.
    pub new_ids: Vec<String>,
    /// Channels whose feed fetch failed.
    pub failures: Vec<ChannelFailure>,
    /// Number of distinct channels diffed.
    pub channels: usize,
}

impl DiffOutcome {
    /// True when there were channels and every one of them failed.
    pub fn total_outage(&self) -> bool {
        self.channels > 0 && self.failures.len() == self.channels
    }
}

/// Subscription index, channel id and the channel's diff.
type ChannelResult = (usize, String, Result<Vec<String>>);

/// Compares channel feeds against the stored videos.
pub struct DiffEngine {
    feed: Arc<dyn ChannelFeed>,
    store: Arc<dyn FeedStore>,
    known_ids_limit: usize,
    concurrency: usize,
}

impl DiffEngine {
    pub fn new(
        feed: Arc<dyn ChannelFeed>,
        store: Arc<dyn FeedStore>,
        known_ids_limit: usize,
        concurrency: usize,
    ) -> Self {
        Self {
            feed,
            store,
            known_ids_limit,
            concurrency: concurrency.max(1),
        }
    }

    /// New ids of a single channel, in feed order.
    pub async fn diff_channel(&self, channel_id: &str) -> Result<Vec<String>> {
        diff_one(
            self.feed.clone(),
            self.store.clone(),
            channel_id.to_string(),
            self.known_ids_limit,
        )
        .await
    }

    /// Diff every channel, at most `concurrency` at a time.
    ///
    /// Every channel runs to completion. A channel failing with a request
    /// error is recorded and skipped; any other error aborts the whole diff
    /// once all channels have finished.
    pub async fn diff(&self, channel_ids: &[String]) -> Result<DiffOutcome> {
        let channels: Vec<String> = {
            let mut seen = HashSet::new();
            channel_ids
                .iter()
                .filter(|c| seen.insert(c.as_str()))
                .cloned()
                .collect()
        };
        let channel_count = channels.len();

        let tasks: Vec<BoxFuture<'static, ChannelResult>> = channels
            .into_iter()
            .enumerate()
            .map(|(index, channel)| {
                let feed = self.feed.clone();
                let store = self.store.clone();
                let limit = self.known_ids_limit;
                async move {
                    let result = diff_one(feed, store, channel.clone(), limit).await;
                    (index, channel, result)
                }
                .boxed()
            })
            .collect();

        let mut results: Vec<ChannelResult> = stream::iter(tasks)
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        // Completion order varies; report in subscription order
        results.sort_by_key(|(index, _, _)| *index);

        let mut outcome = DiffOutcome {
            channels: channel_count,
            ..Default::default()
        };
        let mut emitted = HashSet::new();
        let mut fatal: Option<TubefeedError> = None;

        for (_, channel, result) in results {
            match result {
                Ok(ids) => {
                    for id in ids {
                        if emitted.insert(id.clone()) {
                            outcome.new_ids.push(id);
                        }
                    }
                }
                Err(TubefeedError::Request(e)) => {
                    warn!("Skipping channel {}: {}", channel, e);
                    outcome.failures.push(ChannelFailure {
                        channel_id: channel,
                        error: e,
                    });
                }
                Err(e) => {
                    error!("Diff of channel {} failed: {}", channel, e);
                    fatal.get_or_insert(e);
                }
            }
        }

        if let Some(e) = fatal {
            return Err(e);
        }

        if outcome.total_outage() {
            error!(
                "All {} channel feeds failed, no new videos this cycle",
                outcome.channels
            );
        }

        Ok(outcome)
    }
}

/// Candidate ids of `channel_id` minus its last `limit` known ids.
async fn diff_one(
    feed: Arc<dyn ChannelFeed>,
    store: Arc<dyn FeedStore>,
    channel_id: String,
    limit: usize,
) -> Result<Vec<String>> {
    let candidates = feed.fetch_video_ids(&channel_id).await?;
    let known: HashSet<String> = store
        .last_video_ids(&channel_id, limit)
        .await?
        .into_iter()
        .collect();

    let new_ids: Vec<String> = candidates
        .into_iter()
        .filter(|id| !known.contains(id))
        .collect();
    debug!("Channel {}: {} new video(s)", channel_id, new_ids.len());
    Ok(new_ids)
}
