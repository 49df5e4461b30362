use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Age cutoff for retention deletion.
///
/// Replaces the negative-day sentinel some callers still speak with an
/// explicit choice; `from_days` keeps the old convention at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionCutoff {
    /// Delete regardless of age.
    All,
    /// Delete articles published strictly more than `n` days ago.
    OlderThanDays(u32),
}

impl RetentionCutoff {
    /// Negative means "everything"; zero and positive are literal day counts.
    pub fn from_days(days: i64) -> Self {
        if days < 0 {
            Self::All
        } else {
            Self::OlderThanDays(days as u32)
        }
    }

    /// Instant before which articles qualify, or `None` for "everything".
    pub fn threshold(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::OlderThanDays(n) => Some(now - Duration::days(i64::from(*n))),
        }
    }
}

/// Preview counts for a retention pass, computed with the same selection
/// criteria as the delete itself.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RetentionStats {
    pub total: i64,
    pub unread: i64,
    pub read: i64,
    pub starred: i64,
}
