//! Feed pipeline: channel polling, diffing, the rolling window, rendering and
//! the cycle that ties them together.

mod diff;
mod poller;
mod render;
mod service;
mod updater;
mod window;

pub use diff::{ChannelFailure, DiffEngine, DiffOutcome};
pub use poller::{parse_video_ids, ChannelFeed, ChannelFeedPoller, VIDEO_ID_PREFIX};
pub use render::{AtomRenderer, FeedRenderer};
pub use service::{CycleOptions, CycleReport, FeedService};
pub use updater::{start_feed_updater, FeedUpdater};
pub use window::RollingFeedWindow;
