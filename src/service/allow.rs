use std::sync::Arc;

use crate::app::{Result, WeirError};
use crate::domain::{AllowKeyword, Capabilities};
use crate::store::Store;

/// Global allow keywords available without a Pro entitlement.
pub const FREE_TIER_ALLOW_LIMIT: usize = 3;

pub struct AllowKeywordService<S: Store> {
    store: Arc<S>,
    capabilities: Capabilities,
}

impl<S: Store> AllowKeywordService<S> {
    pub fn new(store: Arc<S>, capabilities: Capabilities) -> Self {
        Self {
            store,
            capabilities,
        }
    }

    pub fn list(&self) -> Result<Vec<AllowKeyword>> {
        self.store.get_all_allow_keywords()
    }

    /// Register a keyword. Quota breach is a distinct error from ordinary
    /// validation so callers can route to an upgrade prompt.
    pub fn add(&self, keyword: &str) -> Result<AllowKeyword> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(WeirError::Validation(
                "allow keyword must not be empty".to_string(),
            ));
        }
        if self.store.allow_keyword_exists(keyword)? {
            return Err(WeirError::Validation(format!(
                "allow keyword already registered: {keyword}"
            )));
        }
        if !self.capabilities.pro
            && self.store.count_allow_keywords()? >= FREE_TIER_ALLOW_LIMIT as i64
        {
            return Err(WeirError::QuotaExceeded {
                limit: FREE_TIER_ALLOW_LIMIT,
            });
        }

        let mut entry = AllowKeyword::new(keyword.to_string());
        entry.id = self.store.add_allow_keyword(&entry)?;
        Ok(entry)
    }

    pub fn remove(&self, id: i64) -> Result<()> {
        self.store.delete_allow_keyword(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn service(pro: bool) -> AllowKeywordService<SqliteStore> {
        AllowKeywordService::new(
            Arc::new(SqliteStore::in_memory().unwrap()),
            Capabilities { pro },
        )
    }

    #[test]
    fn test_add_trims_and_lists() {
        let svc = service(false);
        let added = svc.add("  React ").unwrap();
        assert_eq!(added.keyword, "React");
        assert_eq!(svc.list().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_keyword_rejected() {
        let svc = service(false);
        assert!(matches!(
            svc.add("   ").unwrap_err(),
            WeirError::Validation(_)
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let svc = service(false);
        svc.add("React").unwrap();
        assert!(matches!(
            svc.add("React").unwrap_err(),
            WeirError::Validation(_)
        ));
    }

    #[test]
    fn test_free_tier_quota_is_three() {
        let svc = service(false);
        svc.add("a").unwrap();
        svc.add("b").unwrap();
        svc.add("c").unwrap();

        let err = svc.add("d").unwrap_err();
        assert!(matches!(
            err,
            WeirError::QuotaExceeded {
                limit: FREE_TIER_ALLOW_LIMIT
            }
        ));
    }

    #[test]
    fn test_pro_tier_is_unlimited() {
        let svc = service(true);
        for i in 0..10 {
            svc.add(&format!("keyword{i}")).unwrap();
        }
        assert_eq!(svc.list().unwrap().len(), 10);
    }

    #[test]
    fn test_quota_frees_up_after_removal() {
        let svc = service(false);
        let first = svc.add("a").unwrap();
        svc.add("b").unwrap();
        svc.add("c").unwrap();

        svc.remove(first.id).unwrap();
        svc.add("d").unwrap();
    }
}
