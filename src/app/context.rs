use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, WeirError};
use crate::domain::Capabilities;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::service::{AllowKeywordService, FeedService, FilterService};
use crate::settings::Settings;
use crate::store::SqliteStore;
use crate::sync::SyncService;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub feeds: FeedService<SqliteStore>,
    pub filters: FilterService<SqliteStore>,
    pub allow_keywords: AllowKeywordService<SqliteStore>,
    pub sync: Arc<SyncService<SqliteStore>>,
    pub settings: Settings<SqliteStore>,
}

impl AppContext {
    pub fn new(db_path: Option<PathBuf>, capabilities: Capabilities) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        Ok(Self::wire(store, capabilities))
    }

    pub fn in_memory(capabilities: Capabilities) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self::wire(store, capabilities))
    }

    fn wire(store: Arc<SqliteStore>, capabilities: Capabilities) -> Self {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new());

        Self {
            feeds: FeedService::new(store.clone(), fetcher.clone()),
            filters: FilterService::new(store.clone()),
            allow_keywords: AllowKeywordService::new(store.clone(), capabilities),
            sync: Arc::new(SyncService::new(store.clone(), fetcher.clone())),
            settings: Settings::new(store.clone()),
            store,
            fetcher,
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| WeirError::Config("Could not find data directory".into()))?;
        let weir_dir = data_dir.join("weir");
        std::fs::create_dir_all(&weir_dir)?;
        Ok(weir_dir.join("weir.db"))
    }
}
