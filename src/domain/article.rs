use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub feed_id: i64,
    pub feed_name: String,
    pub title: String,
    pub link: String,
    pub summary: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub is_read: bool,
    pub is_starred: bool,
}

impl Article {
    pub fn new(feed_id: i64, feed_name: &str, title: String, link: String) -> Self {
        Self {
            id: 0,
            feed_id,
            feed_name: feed_name.to_string(),
            title,
            link,
            summary: None,
            thumbnail_url: None,
            published_at: Utc::now(),
            is_read: false,
            is_starred: false,
        }
    }

    /// Text the filter engine matches global allow keywords against.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.summary.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_unread() {
        let article = Article::new(1, "Blog", "Title".into(), "https://a.example/1".into());
        assert!(!article.is_read);
        assert!(!article.is_starred);
        assert_eq!(article.id, 0);
    }

    #[test]
    fn test_searchable_text_without_summary() {
        let article = Article::new(1, "Blog", "Title".into(), "https://a.example/1".into());
        assert_eq!(article.searchable_text(), "Title ");
    }

    #[test]
    fn test_searchable_text_with_summary() {
        let mut article = Article::new(1, "Blog", "Title".into(), "https://a.example/1".into());
        article.summary = Some("Summary".into());
        assert_eq!(article.searchable_text(), "Title Summary");
    }
}
