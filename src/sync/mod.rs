//! Multi-feed synchronization.
//!
//! One pass walks every subscribed feed strictly sequentially: fetch raw
//! bytes, detect the charset, decode, parse, insert what is new. A failure
//! in one feed is contained to that feed. After the walk the retention
//! pruner runs and the last-sync timestamp is recorded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::app::Result;
use crate::domain::{Feed, RetentionCutoff};
use crate::encoding;
use crate::fetcher::Fetcher;
use crate::parser;
use crate::settings::{Settings, RETENTION_UNLIMITED};
use crate::store::Store;

/// Advisory startup throttle; callers compare against the last sync time.
pub const DEFAULT_MIN_SYNC_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Feeds fetched and ingested without error.
    pub fetched: usize,
    /// Articles not previously present.
    pub new_articles: usize,
    /// Articles removed by the retention pass.
    pub deleted: usize,
}

pub struct SyncService<S: Store> {
    store: Arc<S>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    settings: Settings<S>,
    syncing: AtomicBool,
}

impl<S: Store> SyncService<S> {
    pub fn new(store: Arc<S>, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        let settings = Settings::new(store.clone());
        Self {
            store,
            fetcher,
            settings,
            syncing: AtomicBool::new(false),
        }
    }

    /// Run one sync pass over all feeds.
    ///
    /// At most one pass runs at a time; a call arriving while one is in
    /// flight returns a zero outcome immediately without touching storage.
    /// Overlapping requests are dropped, not queued.
    pub async fn refresh(&self) -> Result<SyncOutcome> {
        if self.syncing.swap(true, Ordering::SeqCst) {
            tracing::debug!("sync already in progress, dropping request");
            return Ok(SyncOutcome::default());
        }

        let result = self.run().await;
        self.syncing.store(false, Ordering::SeqCst);
        result
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    async fn run(&self) -> Result<SyncOutcome> {
        let feeds = self.store.get_all_feeds()?;
        let mut outcome = SyncOutcome::default();

        for feed in feeds {
            match self.sync_feed(&feed).await {
                Ok(new_count) => {
                    outcome.fetched += 1;
                    outcome.new_articles += new_count;
                    tracing::debug!("{}: {} new articles", feed.url, new_count);
                }
                Err(e) => {
                    // Contained: the rest of the pass proceeds.
                    tracing::warn!("skipping feed {}: {}", feed.url, e);
                }
            }
        }

        outcome.deleted = self.auto_prune()?;
        self.settings.set_last_synced_at(Utc::now())?;

        tracing::info!(
            "sync complete: {} feeds, {} new, {} pruned",
            outcome.fetched,
            outcome.new_articles,
            outcome.deleted
        );
        Ok(outcome)
    }

    async fn sync_feed(&self, feed: &Feed) -> Result<usize> {
        let bytes = self.fetcher.fetch(&feed.url).await?;
        let charset = encoding::detect(&bytes, &feed.url);
        let text = encoding::decode(&bytes, charset);

        let articles = parser::parse_feed(
            feed.id,
            feed.display_title(),
            &text,
            feed.icon_url.as_deref(),
        )?;

        // The unique key on (feed_id, link) makes re-ingestion a no-op for
        // anything already present.
        self.store.add_articles(&articles)
    }

    fn auto_prune(&self) -> Result<usize> {
        let days = self.settings.retention_days()?;
        if days <= RETENTION_UNLIMITED {
            return Ok(0);
        }

        let include_starred = self.settings.delete_starred()?;
        self.store
            .delete_older_than(RetentionCutoff::OlderThanDays(days as u32), include_starred)
    }

    /// Whether enough time has passed since the last completed sync. Purely
    /// advisory; the caller owns the auto-sync decision.
    pub fn should_sync(&self, min_interval: Duration) -> Result<bool> {
        match self.settings.last_synced_at()? {
            None => Ok(true),
            Some(last) => {
                let elapsed = Utc::now().signed_duration_since(last);
                Ok(elapsed.to_std().map_or(true, |e| e >= min_interval))
            }
        }
    }

    pub fn last_synced_at(&self) -> Result<Option<chrono::DateTime<Utc>>> {
        self.settings.last_synced_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use tokio::sync::Notify;

    use crate::app::WeirError;
    use crate::domain::Article;
    use crate::store::SqliteStore;

    const RSS_A: &str = r#"<rss version="2.0"><channel>
  <title>Feed A</title>
  <item><title>a1</title><link>https://a.example/1</link></item>
  <item><title>a2</title><link>https://a.example/2</link></item>
</channel></rss>"#;

    const RSS_B: &str = r#"<rss version="2.0"><channel>
  <title>Feed B</title>
  <item><title>b1</title><link>https://b.example/1</link></item>
</channel></rss>"#;

    struct ScriptedFetcher {
        responses: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.responses.get(url).cloned().ok_or_else(|| {
                WeirError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("no response for {url}"),
                ))
            })
        }
    }

    /// Fetcher that parks until released, to hold a sync pass open.
    struct GatedFetcher {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Fetcher for GatedFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(RSS_A.as_bytes().to_vec())
        }
    }

    fn seed_feed(store: &SqliteStore, title: &str, url: &str) -> i64 {
        store
            .add_feed(&crate::domain::Feed::new(title.into(), url.into()))
            .unwrap()
    }

    fn scripted_service(
        store: Arc<SqliteStore>,
        responses: &[(&str, &str)],
    ) -> SyncService<SqliteStore> {
        let fetcher = ScriptedFetcher {
            responses: responses
                .iter()
                .map(|(url, body)| (url.to_string(), body.as_bytes().to_vec()))
                .collect(),
        };
        SyncService::new(store, Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_refresh_ingests_all_feeds() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        seed_feed(&store, "A", "https://a.example/feed");
        seed_feed(&store, "B", "https://b.example/feed");

        let svc = scripted_service(
            store.clone(),
            &[
                ("https://a.example/feed", RSS_A),
                ("https://b.example/feed", RSS_B),
            ],
        );

        let outcome = svc.refresh().await.unwrap();
        assert_eq!(outcome.fetched, 2);
        assert_eq!(outcome.new_articles, 3);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(store.get_all_articles().unwrap().len(), 3);
        assert!(svc.last_synced_at().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        seed_feed(&store, "A", "https://a.example/feed");

        let svc = scripted_service(store.clone(), &[("https://a.example/feed", RSS_A)]);

        assert_eq!(svc.refresh().await.unwrap().new_articles, 2);
        // Same document again: nothing new, nothing duplicated.
        assert_eq!(svc.refresh().await.unwrap().new_articles, 0);
        assert_eq!(store.get_all_articles().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_per_feed_failure_is_isolated() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        seed_feed(&store, "A", "https://a.example/feed");
        seed_feed(&store, "Broken", "https://broken.example/feed");
        seed_feed(&store, "NotAFeed", "https://html.example/feed");

        let svc = scripted_service(
            store.clone(),
            &[
                ("https://a.example/feed", RSS_A),
                // broken.example has no scripted response -> network error
                ("https://html.example/feed", "<html>nope</html>"),
            ],
        );

        let outcome = svc.refresh().await.unwrap();
        assert_eq!(outcome.fetched, 1);
        assert_eq!(outcome.new_articles, 2);
    }

    #[tokio::test]
    async fn test_refresh_runs_retention_pass() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let feed_id = seed_feed(&store, "A", "https://a.example/feed");

        let mut old = Article::new(
            feed_id,
            "A",
            "ancient".into(),
            "https://a.example/ancient".into(),
        );
        old.published_at = Utc::now() - ChronoDuration::days(30);
        store.add_articles(&[old]).unwrap();

        let svc = scripted_service(store.clone(), &[("https://a.example/feed", RSS_A)]);
        Settings::new(store.clone()).set_retention_days(7).unwrap();

        let outcome = svc.refresh().await.unwrap();
        assert_eq!(outcome.deleted, 1);
    }

    #[tokio::test]
    async fn test_unlimited_retention_skips_pruning() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let feed_id = seed_feed(&store, "A", "https://a.example/feed");

        let mut old = Article::new(
            feed_id,
            "A",
            "ancient".into(),
            "https://a.example/ancient".into(),
        );
        old.published_at = Utc::now() - ChronoDuration::days(365);
        store.add_articles(&[old]).unwrap();

        // retention_days defaults to 0 = unlimited
        let svc = scripted_service(store.clone(), &[("https://a.example/feed", RSS_A)]);
        let outcome = svc.refresh().await.unwrap();
        assert_eq!(outcome.deleted, 0);
        assert_eq!(store.get_all_articles().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_overlapping_refresh_returns_zero_outcome() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        seed_feed(&store, "A", "https://a.example/feed");

        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let svc = Arc::new(SyncService::new(
            store.clone(),
            Arc::new(GatedFetcher {
                started: started.clone(),
                release: release.clone(),
            }),
        ));

        let background = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.refresh().await })
        };
        started.notified().await;
        assert!(svc.is_syncing());

        // Second call while the first is parked: dropped, storage untouched.
        let overlapping = svc.refresh().await.unwrap();
        assert_eq!(overlapping, SyncOutcome::default());
        assert!(store.get_all_articles().unwrap().is_empty());
        assert!(svc.last_synced_at().unwrap().is_none());

        release.notify_one();
        let first = background.await.unwrap().unwrap();
        assert_eq!(first.fetched, 1);
        assert!(!svc.is_syncing());
    }

    #[tokio::test]
    async fn test_should_sync_respects_interval() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let svc = scripted_service(store.clone(), &[]);

        // Never synced: go ahead.
        assert!(svc.should_sync(DEFAULT_MIN_SYNC_INTERVAL).unwrap());

        svc.refresh().await.unwrap();
        assert!(!svc.should_sync(DEFAULT_MIN_SYNC_INTERVAL).unwrap());
        assert!(svc.should_sync(Duration::ZERO).unwrap());
    }
}
