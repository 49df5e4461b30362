use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub icon_url: Option<String>,
    pub order_no: i64,
    pub created_at: DateTime<Utc>,
}

impl Feed {
    pub fn new(title: String, url: String) -> Self {
        Self {
            id: 0,
            title,
            url,
            icon_url: None,
            order_no: 0,
            created_at: Utc::now(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon_url: Option<String>,
}
