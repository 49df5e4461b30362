use std::sync::Arc;

use url::Url;

use crate::app::{Result, WeirError};
use crate::domain::{Feed, FeedUpdate};
use crate::encoding;
use crate::fetcher::Fetcher;
use crate::parser;
use crate::store::Store;

/// Common feed locations probed during auto-detection, in order.
pub const FEED_PROBE_PATHS: [&str; 8] = [
    "/feed",
    "/feed.xml",
    "/rss",
    "/rss.xml",
    "/atom.xml",
    "/index.xml",
    "/feeds",
    "/feeds/posts/default",
];

pub struct FeedService<S: Store> {
    store: Arc<S>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl<S: Store> FeedService<S> {
    pub fn new(store: Arc<S>, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self { store, fetcher }
    }

    pub fn list(&self) -> Result<Vec<Feed>> {
        self.store.get_all_feeds()
    }

    pub fn get(&self, id: i64) -> Result<Option<Feed>> {
        self.store.get_feed(id)
    }

    pub fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        self.store.get_feed_by_url(url)
    }

    /// Subscribe to a feed and ingest its current articles.
    ///
    /// The row is created first and removed again if the document turns out
    /// not to be a feed, so a failed add leaves no trace.
    pub async fn add(&self, url: &str, title: Option<&str>) -> Result<Feed> {
        Url::parse(url)?;

        if self.store.get_feed_by_url(url)?.is_some() {
            return Err(WeirError::Validation(format!("already subscribed: {url}")));
        }

        let feed = Feed::new(title.unwrap_or(url).to_string(), url.to_string());
        let feed_id = self.store.add_feed(&feed)?;

        match self.ingest(feed_id, url, title).await {
            Ok(()) => Ok(self
                .store
                .get_feed(feed_id)?
                .ok_or_else(|| WeirError::FeedNotFound(url.to_string()))?),
            Err(e) => {
                self.store.delete_feed(feed_id)?;
                Err(e)
            }
        }
    }

    async fn ingest(&self, feed_id: i64, url: &str, title: Option<&str>) -> Result<()> {
        let bytes = self.fetcher.fetch(url).await?;
        let charset = encoding::detect(&bytes, url);
        let text = encoding::decode(&bytes, charset);

        // An explicit title wins over whatever the channel declares.
        let channel_title = parser::parse_channel_title(&text)?;
        let feed_name = title
            .map(String::from)
            .or(channel_title)
            .unwrap_or_else(|| url.to_string());
        self.store.update_feed(
            feed_id,
            &FeedUpdate {
                title: Some(feed_name.clone()),
                ..FeedUpdate::default()
            },
        )?;

        let articles = parser::parse_feed(feed_id, &feed_name, &text, None)?;
        self.store.add_articles(&articles)?;
        Ok(())
    }

    pub fn update(&self, id: i64, update: &FeedUpdate) -> Result<()> {
        if self.store.get_feed(id)?.is_none() {
            return Err(WeirError::FeedNotFound(id.to_string()));
        }
        self.store.update_feed(id, update)
    }

    pub fn remove(&self, url: &str) -> Result<()> {
        let feed = self
            .store
            .get_feed_by_url(url)?
            .ok_or_else(|| WeirError::FeedNotFound(url.to_string()))?;
        self.store.delete_feed(feed.id)
    }

    /// Rewrite display ordering; positions become contiguous `order_no`s.
    pub fn reorder(&self, ids: &[i64]) -> Result<()> {
        self.store.reorder_feeds(ids)
    }

    /// Probe the common feed paths under `base_url` and return the first
    /// one that parses as a feed, or `None` if none do.
    pub async fn detect_feed_url(&self, base_url: &str) -> Result<Option<String>> {
        let base = Url::parse(base_url)?;

        for path in FEED_PROBE_PATHS {
            let candidate = match base.join(path) {
                Ok(url) => url,
                Err(_) => continue,
            };

            let bytes = match self.fetcher.fetch(candidate.as_str()).await {
                Ok(bytes) => bytes,
                Err(_) => continue,
            };

            let charset = encoding::detect(&bytes, candidate.as_str());
            let text = encoding::decode(&bytes, charset);
            if parser::parse_feed(0, "", &text, None).is_ok() {
                return Ok(Some(candidate.into()));
            }
        }

        Ok(None)
    }
}
