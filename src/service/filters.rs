use std::sync::Arc;

use crate::app::{Result, WeirError};
use crate::domain::FilterRule;
use crate::store::Store;

pub struct FilterService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> FilterService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Rules in creation order. The filter engine treats the order as
    /// caller-defined; no canonical ordering is guaranteed.
    pub fn list(&self) -> Result<Vec<FilterRule>> {
        self.store.get_all_filters()
    }

    pub fn get(&self, id: i64) -> Result<Option<FilterRule>> {
        self.store.get_filter(id)
    }

    pub fn add(&self, rule: &FilterRule) -> Result<i64> {
        Self::validate(rule)?;
        self.store.add_filter(rule)
    }

    pub fn update(&self, rule: &FilterRule) -> Result<()> {
        Self::validate(rule)?;
        if self.store.get_filter(rule.id)?.is_none() {
            return Err(WeirError::FilterNotFound(rule.id));
        }
        self.store.update_filter(rule)
    }

    pub fn remove(&self, id: i64) -> Result<()> {
        if self.store.get_filter(id)?.is_none() {
            return Err(WeirError::FilterNotFound(id));
        }
        self.store.delete_filter(id)
    }

    /// Editor-side validation; rejected rules never reach the store. The
    /// engine itself still degrades gracefully on rules that slip through.
    fn validate(rule: &FilterRule) -> Result<()> {
        if rule.block_keyword.trim().is_empty() {
            return Err(WeirError::Validation(
                "block keyword must not be empty".to_string(),
            ));
        }
        if !rule.target_title && !rule.target_description {
            return Err(WeirError::Validation(
                "filter must target the title or the description".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn service() -> FilterService<SqliteStore> {
        FilterService::new(Arc::new(SqliteStore::in_memory().unwrap()))
    }

    #[test]
    fn test_add_and_list() {
        let svc = service();
        svc.add(&FilterRule::new("FX".into())).unwrap();
        svc.add(&FilterRule::new("ゴシップ".into())).unwrap();

        let rules = svc.list().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].block_keyword, "FX");
    }

    #[test]
    fn test_empty_block_keyword_rejected() {
        let svc = service();
        let err = svc.add(&FilterRule::new("   ".into())).unwrap_err();
        assert!(matches!(err, WeirError::Validation(_)));
    }

    #[test]
    fn test_rule_targeting_nothing_rejected() {
        let svc = service();
        let mut rule = FilterRule::new("FX".into());
        rule.target_title = false;
        rule.target_description = false;
        let err = svc.add(&rule).unwrap_err();
        assert!(matches!(err, WeirError::Validation(_)));
    }

    #[test]
    fn test_update_missing_rule_is_not_found() {
        let svc = service();
        let mut rule = FilterRule::new("FX".into());
        rule.id = 99;
        assert!(matches!(
            svc.update(&rule).unwrap_err(),
            WeirError::FilterNotFound(99)
        ));
    }

    #[test]
    fn test_remove_missing_rule_is_not_found() {
        let svc = service();
        assert!(matches!(
            svc.remove(7).unwrap_err(),
            WeirError::FilterNotFound(7)
        ));
    }
}
