pub mod allow;
pub mod feeds;
pub mod filters;

pub use allow::{AllowKeywordService, FREE_TIER_ALLOW_LIMIT};
pub use feeds::{FeedService, FEED_PROBE_PATHS};
pub use filters::FilterService;
