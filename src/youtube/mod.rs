//! Video data API: typed schemas, paginated fetching and batched lookups.

mod api;
mod client;
mod pagination;
mod resolver;
mod types;

pub use api::YoutubeApi;
pub use client::YoutubeClient;
pub use pagination::{fetch_all, parse_page, PageRequest, PageSource};
pub use resolver::VideoInfoResolver;
pub use types::{
    ApiResource, ChannelKind, ContentDetails, Localized, Page, PageInfo, RegionRestriction,
    ResourceKind, SearchResultId, SearchResultKind, SearchResultSnippet, SearchResultVideo,
    Subscription, SubscriptionKind, SubscriptionResource, SubscriptionSnippet, Thumbnail,
    Thumbnails, VideoItem, VideoKind, VideoPlayer, VideoSnippet, VideoStatistics, VideoStatus,
};
