//! Typed access to the key-value settings table.
//!
//! Retention policy and the last-sync timestamp are runtime-mutable user
//! state, so they live in the store rather than a config file.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::store::Store;

pub const KEY_RETENTION_DAYS: &str = "retention_days";
pub const KEY_DELETE_STARRED: &str = "delete_starred";
pub const KEY_LAST_SYNCED_AT: &str = "last_synced_at";

/// Retention of 0 days means "keep everything"; the automatic pruning pass
/// is disabled entirely.
pub const RETENTION_UNLIMITED: i64 = 0;

pub struct Settings<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for Settings<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Store> Settings<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn retention_days(&self) -> Result<i64> {
        Ok(self
            .store
            .get_setting(KEY_RETENTION_DAYS)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(RETENTION_UNLIMITED))
    }

    pub fn set_retention_days(&self, days: i64) -> Result<()> {
        self.store.set_setting(KEY_RETENTION_DAYS, &days.to_string())
    }

    pub fn delete_starred(&self) -> Result<bool> {
        Ok(self
            .store
            .get_setting(KEY_DELETE_STARRED)?
            .map(|v| v == "true")
            .unwrap_or(false))
    }

    pub fn set_delete_starred(&self, enabled: bool) -> Result<()> {
        self.store
            .set_setting(KEY_DELETE_STARRED, if enabled { "true" } else { "false" })
    }

    pub fn last_synced_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .store
            .get_setting(KEY_LAST_SYNCED_AT)?
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    pub fn set_last_synced_at(&self, at: DateTime<Utc>) -> Result<()> {
        self.store.set_setting(KEY_LAST_SYNCED_AT, &at.to_rfc3339())
    }
}
