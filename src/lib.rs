pub mod aggregator;
pub mod browse;
pub mod cache;
pub mod config;
pub mod db;
pub mod extract;
pub mod gallery;
pub mod github;
pub mod render;
pub mod storage;
pub mod types;
pub mod view;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::gallery::{Gallery, GalleryFrame, GallerySelection, PreviewElement, Teardown};
    pub use crate::types::{CacheEntry, MediaItem, ProjectRecord, ProjectStore};
    pub use crate::view::{ListView, ProjectCard};
    pub use crate::Showcase;
}

use anyhow::Result;

use crate::aggregator::Aggregator;
use crate::cache::CacheStatus;
use crate::config::Config;
use crate::db::Database;
use crate::github::{GitHubClient, RepoHost};
use crate::render::SiteWriter;
use crate::storage::{MemoryStorage, Storage};
use crate::types::ProjectStore;

/// Async library entry point. Owns the acquisition pass and its cache slot.
pub struct Showcase {
    config: Config,
    aggregator: Aggregator,
}

impl Showcase {
    /// Connect the SQLite cache (running migrations) and build a GitHub client from `config`.
    pub async fn connect(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Database::connect(config.database_url.as_deref()).await?;
        db.run_migrations().await?;
        let host = GitHubClient::new(&config)?;
        Ok(Self::with_parts(config, Box::new(host), Box::new(db)))
    }

    /// Same as [`Showcase::connect`] but the cache lives only as long as the process.
    pub fn in_memory(config: Config) -> Result<Self> {
        config.validate()?;
        let host = GitHubClient::new(&config)?;
        Ok(Self::with_parts(config, Box::new(host), Box::new(MemoryStorage::new())))
    }

    pub fn with_parts(config: Config, host: Box<dyn RepoHost>, storage: Box<dyn Storage>) -> Self {
        let aggregator = Aggregator::new(host, storage, &config);
        Self { config, aggregator }
    }

    pub fn config(&self) -> &Config { &self.config }

    /// Run the acquisition pass (or serve the cache) and return the records in listing order.
    pub async fn load_projects(&self, refresh: bool) -> Result<ProjectStore> {
        Ok(ProjectStore::new(self.aggregator.load_projects(refresh).await?))
    }

    pub async fn cache_status(&self) -> CacheStatus { self.aggregator.cache_status().await }

    pub async fn clear_cache(&self) -> Result<u64> { self.aggregator.clear_cache().await }

    pub fn site_writer(&self) -> SiteWriter {
        SiteWriter::new(self.config.out_dir.clone(), format!("{}'s Projects", self.config.user))
    }
}

pub fn current_epoch_millis() -> i64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as i64
}
