use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{LiftoffError, Result};
use crate::config::Config;
use crate::fetcher::{Connectivity, HttpFetcher, NewsApi, StaticConnectivity, SystemProbe};
use crate::pipeline::{FetchOptions, NewsRepository, Pipeline, SignalSink};
use crate::store::{Preferences, SqlitePreferenceStore};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqlitePreferenceStore>,
    pub repository: NewsRepository,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqlitePreferenceStore::new(&db_path)?);
        let api: Arc<dyn NewsApi + Send + Sync> = Arc::new(HttpFetcher::new(&config.api)?);
        let connectivity: Arc<dyn Connectivity + Send + Sync> = if config.pipeline.assume_online {
            Arc::new(StaticConnectivity(true))
        } else {
            Arc::new(SystemProbe::new())
        };

        Ok(Self::assemble(config, store, api, connectivity))
    }

    /// Context over an in-memory store with caller-supplied transport.
    pub fn with_parts(
        config: Config,
        api: Arc<dyn NewsApi + Send + Sync>,
        connectivity: Arc<dyn Connectivity + Send + Sync>,
    ) -> Result<Self> {
        let store = Arc::new(SqlitePreferenceStore::in_memory()?);
        Ok(Self::assemble(config, store, api, connectivity))
    }

    fn assemble(
        config: Config,
        store: Arc<SqlitePreferenceStore>,
        api: Arc<dyn NewsApi + Send + Sync>,
        connectivity: Arc<dyn Connectivity + Send + Sync>,
    ) -> Self {
        let signals = SignalSink::new(config.pipeline.signal_capacity);
        let pipeline = Pipeline::new(connectivity, store.clone(), signals)
            .with_defaults(FetchOptions::from(&config.pipeline));
        let repository = NewsRepository::new(api, pipeline);

        Self {
            config,
            store,
            repository,
        }
    }

    pub fn signals(&self) -> &SignalSink {
        self.repository.pipeline().signals()
    }

    pub fn preferences(&self) -> Preferences<'_, SqlitePreferenceStore> {
        Preferences::new(self.store.as_ref())
    }

    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| LiftoffError::Config("Could not find data directory".into()))?;
        let liftoff_dir = data_dir.join("liftoff");
        std::fs::create_dir_all(&liftoff_dir)?;
        Ok(liftoff_dir)
    }

    pub fn default_db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("liftoff.db"))
    }

    /// Log file used while the terminal is owned by the TUI.
    pub fn default_log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("liftoff.log"))
    }
}
