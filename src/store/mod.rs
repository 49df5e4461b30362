pub mod sqlite;

use crate::app::Result;
use crate::domain::{
    AllowKeyword, Article, Feed, FeedUpdate, FilterRule, RetentionCutoff, RetentionStats,
};

pub use sqlite::SqliteStore;

pub trait Store {
    // Feed operations
    fn add_feed(&self, feed: &Feed) -> Result<i64>;
    fn get_feed(&self, id: i64) -> Result<Option<Feed>>;
    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>>;
    fn get_all_feeds(&self) -> Result<Vec<Feed>>;
    fn update_feed(&self, id: i64, update: &FeedUpdate) -> Result<()>;
    fn delete_feed(&self, id: i64) -> Result<()>;
    /// Rewrite display ordering: position in `ids` becomes `order_no`.
    fn reorder_feeds(&self, ids: &[i64]) -> Result<()>;

    // Article operations
    /// Batch insert in one transaction. Conflicts on `(feed_id, link)` are
    /// "already present", not errors; the count reflects genuinely new rows.
    fn add_articles(&self, articles: &[Article]) -> Result<usize>;
    fn get_article(&self, id: i64) -> Result<Option<Article>>;
    fn get_all_articles(&self) -> Result<Vec<Article>>;
    fn get_articles_by_feed(&self, feed_id: i64) -> Result<Vec<Article>>;
    fn set_read(&self, id: i64, is_read: bool) -> Result<()>;
    fn set_starred(&self, id: i64, is_starred: bool) -> Result<()>;
    fn delete_article(&self, id: i64) -> Result<()>;
    fn unread_count(&self, feed_id: i64) -> Result<i64>;

    // Retention. Delete and stats share one selection predicate so a
    // preview can never disagree with the deletion that follows it.
    fn delete_older_than(&self, cutoff: RetentionCutoff, include_starred: bool) -> Result<usize>;
    fn retention_stats(
        &self,
        cutoff: RetentionCutoff,
        include_starred: bool,
    ) -> Result<RetentionStats>;

    // Filter rules
    fn add_filter(&self, rule: &FilterRule) -> Result<i64>;
    fn get_filter(&self, id: i64) -> Result<Option<FilterRule>>;
    fn get_all_filters(&self) -> Result<Vec<FilterRule>>;
    fn update_filter(&self, rule: &FilterRule) -> Result<()>;
    fn delete_filter(&self, id: i64) -> Result<()>;

    // Global allow keywords
    fn add_allow_keyword(&self, keyword: &AllowKeyword) -> Result<i64>;
    fn get_all_allow_keywords(&self) -> Result<Vec<AllowKeyword>>;
    fn count_allow_keywords(&self) -> Result<i64>;
    fn allow_keyword_exists(&self, keyword: &str) -> Result<bool>;
    fn delete_allow_keyword(&self, id: i64) -> Result<()>;

    // Key-value settings
    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;
}
