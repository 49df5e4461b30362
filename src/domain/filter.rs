use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A block rule with optional rule-scoped allow exceptions.
///
/// `allow_keywords` is a comma-separated list; any entry found in the
/// rule's target text neutralizes the block for that rule only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRule {
    pub id: i64,
    pub block_keyword: String,
    pub allow_keywords: Option<String>,
    pub target_title: bool,
    pub target_description: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilterRule {
    pub fn new(block_keyword: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            block_keyword,
            allow_keywords: None,
            target_title: true,
            target_description: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Comma-split allow keywords, trimmed and lowercased, empties dropped.
    pub fn allow_list(&self) -> Vec<String> {
        self.allow_keywords
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// A keyword on the global allow-list; a match displays the article
/// unconditionally, before any rule is evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowKeyword {
    pub id: i64,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
}

impl AllowKeyword {
    pub fn new(keyword: String) -> Self {
        Self {
            id: 0,
            keyword,
            created_at: Utc::now(),
        }
    }
}

/// Entitlements supplied by the caller; gates the allow-keyword quota.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    pub pro: bool,
}
