use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, WeirError};
use crate::domain::{
    AllowKeyword, Article, Feed, FeedUpdate, FilterRule, RetentionCutoff, RetentionStats,
};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| WeirError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            WeirError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    /// Selection predicate shared by the retention delete and its stats
    /// preview. Returned as a WHERE fragment plus positional params.
    fn retention_predicate(
        cutoff: RetentionCutoff,
        include_starred: bool,
    ) -> (String, Vec<String>) {
        let mut clause = String::from("1=1");
        let mut args = Vec::new();

        if let Some(threshold) = cutoff.threshold(Utc::now()) {
            args.push(threshold.to_rfc3339());
            clause.push_str(&format!(" AND published_at < ?{}", args.len()));
        }
        if !include_starred {
            clause.push_str(" AND is_starred = 0");
        }

        (clause, args)
    }
}

fn feed_from_row(row: &Row<'_>) -> rusqlite::Result<Feed> {
    Ok(Feed {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        icon_url: row.get(3)?,
        order_no: row.get(4)?,
        created_at: row
            .get::<_, String>(5)
            .ok()
            .and_then(|s| SqliteStore::parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        feed_id: row.get(1)?,
        feed_name: row.get(2)?,
        title: row.get(3)?,
        link: row.get(4)?,
        summary: row.get(5)?,
        thumbnail_url: row.get(6)?,
        published_at: row
            .get::<_, String>(7)
            .ok()
            .and_then(|s| SqliteStore::parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        is_read: row.get::<_, i32>(8)? != 0,
        is_starred: row.get::<_, i32>(9)? != 0,
    })
}

fn filter_from_row(row: &Row<'_>) -> rusqlite::Result<FilterRule> {
    Ok(FilterRule {
        id: row.get(0)?,
        block_keyword: row.get(1)?,
        allow_keywords: row.get(2)?,
        target_title: row.get::<_, i32>(3)? != 0,
        target_description: row.get::<_, i32>(4)? != 0,
        created_at: row
            .get::<_, String>(5)
            .ok()
            .and_then(|s| SqliteStore::parse_datetime(&s))
            .unwrap_or_else(Utc::now),
        updated_at: row
            .get::<_, String>(6)
            .ok()
            .and_then(|s| SqliteStore::parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}

fn keyword_from_row(row: &Row<'_>) -> rusqlite::Result<AllowKeyword> {
    Ok(AllowKeyword {
        id: row.get(0)?,
        keyword: row.get(1)?,
        created_at: row
            .get::<_, String>(2)
            .ok()
            .and_then(|s| SqliteStore::parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}

const FEED_COLUMNS: &str = "id, title, url, icon_url, order_no, created_at";
const ARTICLE_COLUMNS: &str =
    "id, feed_id, feed_name, title, link, summary, thumbnail_url, published_at, is_read, is_starred";
const FILTER_COLUMNS: &str =
    "id, block_keyword, allow_keywords, target_title, target_description, created_at, updated_at";

impl Store for SqliteStore {
    fn add_feed(&self, feed: &Feed) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO feeds (title, url, icon_url, order_no, created_at)
             VALUES (?1, ?2, ?3, (SELECT COALESCE(MAX(order_no) + 1, 0) FROM feeds), ?4)",
            params![feed.title, feed.url, feed.icon_url, feed.created_at.to_rfc3339()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn get_feed(&self, id: i64) -> Result<Option<Feed>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                &format!("SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?1"),
                params![id],
                feed_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                &format!("SELECT {FEED_COLUMNS} FROM feeds WHERE url = ?1"),
                params![url],
                feed_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_all_feeds(&self) -> Result<Vec<Feed>> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare(&format!("SELECT {FEED_COLUMNS} FROM feeds ORDER BY order_no, id"))?;

        let feeds = stmt
            .query_map([], feed_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(feeds)
    }

    fn update_feed(&self, id: i64, update: &FeedUpdate) -> Result<()> {
        let conn = self.lock()?;

        if let Some(ref title) = update.title {
            conn.execute("UPDATE feeds SET title = ?1 WHERE id = ?2", params![title, id])?;
        }
        if let Some(ref url) = update.url {
            conn.execute("UPDATE feeds SET url = ?1 WHERE id = ?2", params![url, id])?;
        }
        if let Some(ref icon_url) = update.icon_url {
            conn.execute(
                "UPDATE feeds SET icon_url = ?1 WHERE id = ?2",
                params![icon_url, id],
            )?;
        }

        Ok(())
    }

    fn delete_feed(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM feeds WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn reorder_feeds(&self, ids: &[i64]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for (position, id) in ids.iter().enumerate() {
            tx.execute(
                "UPDATE feeds SET order_no = ?1 WHERE id = ?2",
                params![position as i64, id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn add_articles(&self, articles: &[Article]) -> Result<usize> {
        let mut conn = self.lock()?;

        let tx = conn.transaction()?;
        let mut count = 0;

        for article in articles {
            let result = tx.execute(
                "INSERT OR IGNORE INTO articles
                 (feed_id, feed_name, title, link, summary, thumbnail_url, published_at, is_read, is_starred)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    article.feed_id,
                    article.feed_name,
                    article.title,
                    article.link,
                    article.summary,
                    article.thumbnail_url,
                    article.published_at.to_rfc3339(),
                    article.is_read as i32,
                    article.is_starred as i32,
                ],
            );
            // OR IGNORE already absorbs dedup-key conflicts; any other
            // single-row failure is logged and the batch continues.
            match result {
                Ok(inserted) => count += inserted,
                Err(e) => tracing::warn!("failed to insert article {}: {}", article.link, e),
            }
        }

        tx.commit()?;
        Ok(count)
    }

    fn get_article(&self, id: i64) -> Result<Option<Article>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"),
                params![id],
                article_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_all_articles(&self) -> Result<Vec<Article>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY published_at DESC, id DESC"
        ))?;

        let articles = stmt
            .query_map([], article_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn get_articles_by_feed(&self, feed_id: i64) -> Result<Vec<Article>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE feed_id = ?1
             ORDER BY published_at DESC, id DESC"
        ))?;

        let articles = stmt
            .query_map(params![feed_id], article_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn set_read(&self, id: i64, is_read: bool) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE articles SET is_read = ?1 WHERE id = ?2",
            params![is_read as i32, id],
        )?;
        Ok(())
    }

    fn set_starred(&self, id: i64, is_starred: bool) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE articles SET is_starred = ?1 WHERE id = ?2",
            params![is_starred as i32, id],
        )?;
        Ok(())
    }

    fn delete_article(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM articles WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn unread_count(&self, feed_id: i64) -> Result<i64> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE feed_id = ?1 AND is_read = 0",
            params![feed_id],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    fn delete_older_than(&self, cutoff: RetentionCutoff, include_starred: bool) -> Result<usize> {
        let (clause, args) = Self::retention_predicate(cutoff, include_starred);
        let conn = self.lock()?;

        let deleted = conn.execute(
            &format!("DELETE FROM articles WHERE {clause}"),
            params_from_iter(args.iter()),
        )?;

        Ok(deleted)
    }

    fn retention_stats(
        &self,
        cutoff: RetentionCutoff,
        include_starred: bool,
    ) -> Result<RetentionStats> {
        let (clause, args) = Self::retention_predicate(cutoff, include_starred);
        let conn = self.lock()?;

        let stats = conn.query_row(
            &format!(
                "SELECT COUNT(*),
                        COALESCE(SUM(is_read = 0), 0),
                        COALESCE(SUM(is_read = 1), 0),
                        COALESCE(SUM(is_starred = 1), 0)
                 FROM articles WHERE {clause}"
            ),
            params_from_iter(args.iter()),
            |row| {
                Ok(RetentionStats {
                    total: row.get(0)?,
                    unread: row.get(1)?,
                    read: row.get(2)?,
                    starred: row.get(3)?,
                })
            },
        )?;

        Ok(stats)
    }

    fn add_filter(&self, rule: &FilterRule) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO filters
             (block_keyword, allow_keywords, target_title, target_description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                rule.block_keyword,
                rule.allow_keywords,
                rule.target_title as i32,
                rule.target_description as i32,
                rule.created_at.to_rfc3339(),
                rule.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn get_filter(&self, id: i64) -> Result<Option<FilterRule>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                &format!("SELECT {FILTER_COLUMNS} FROM filters WHERE id = ?1"),
                params![id],
                filter_from_row,
            )
            .optional()?;

        Ok(result)
    }

    fn get_all_filters(&self) -> Result<Vec<FilterRule>> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare(&format!("SELECT {FILTER_COLUMNS} FROM filters ORDER BY id"))?;

        let rules = stmt
            .query_map([], filter_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rules)
    }

    fn update_filter(&self, rule: &FilterRule) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "UPDATE filters SET block_keyword = ?1, allow_keywords = ?2,
             target_title = ?3, target_description = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                rule.block_keyword,
                rule.allow_keywords,
                rule.target_title as i32,
                rule.target_description as i32,
                Utc::now().to_rfc3339(),
                rule.id,
            ],
        )?;

        Ok(())
    }

    fn delete_filter(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM filters WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn add_allow_keyword(&self, keyword: &AllowKeyword) -> Result<i64> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO allow_keywords (keyword, created_at) VALUES (?1, ?2)",
            params![keyword.keyword, keyword.created_at.to_rfc3339()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn get_all_allow_keywords(&self) -> Result<Vec<AllowKeyword>> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT id, keyword, created_at FROM allow_keywords ORDER BY id")?;

        let keywords = stmt
            .query_map([], keyword_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(keywords)
    }

    fn count_allow_keywords(&self) -> Result<i64> {
        let conn = self.lock()?;

        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM allow_keywords", [], |row| row.get(0))?;

        Ok(count)
    }

    fn allow_keyword_exists(&self, keyword: &str) -> Result<bool> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM allow_keywords WHERE keyword = ?1",
            params![keyword],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn delete_allow_keyword(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM allow_keywords WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(result)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;

        Ok(())
    }
}
