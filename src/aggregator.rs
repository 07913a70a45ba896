use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::cache::{cache_key, is_fresh, CacheStatus, CacheStore};
use crate::config::Config;
use crate::extract::{extract_description, extract_title};
use crate::github::{RepoHost, RepoSummary};
use crate::storage::Storage;
use crate::types::{CacheEntry, Manifest, ProjectRecord, THUMBNAIL_PLACEHOLDER};

/// Repositories without this file in their root are not portfolio projects.
pub const MANIFEST_FILE: &str = "portfolio.json";
/// Matched ignoring ASCII case.
pub const README_FILE: &str = "readme.md";

/// Aggregator owns the repository host and the cache slot and runs the acquisition pass.
pub struct Aggregator {
    host: Box<dyn RepoHost>,
    cache: CacheStore<Box<dyn Storage>>,
    user: String,
    cache_ttl: Duration,
    concurrency: usize,
    busy: AtomicBool,
}

impl Aggregator {
    pub fn new(host: Box<dyn RepoHost>, storage: Box<dyn Storage>, config: &Config) -> Self {
        Self {
            host,
            cache: CacheStore::new(storage),
            user: config.user.clone(),
            cache_ttl: config.cache_ttl,
            concurrency: config.concurrency.max(1),
            busy: AtomicBool::new(false),
        }
    }

    pub fn cache_key(&self) -> String { cache_key(&self.user) }

    /// Project list for the configured user, from the cache when fresh.
    ///
    /// Only a failed repository listing is an error; any single repository that cannot
    /// be read is logged and left out. A fetched list is always written back to the
    /// cache, even when empty.
    pub async fn load_projects(&self, refresh: bool) -> Result<Vec<ProjectRecord>> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let key = self.cache_key();

        if !refresh {
            if let Some(entry) = self.cache.read_cache(&key).await {
                if is_fresh(&entry, crate::current_epoch_millis(), self.cache_ttl) {
                    info!("Loaded {} projects from local cache", entry.data.len());
                    return Ok(entry.data);
                }
                debug!("cache entry for {} is stale", key);
            }
        }

        let repos = self.host.list_repos(&self.user).await.context("fetching repository list")?;
        info!("Found {} repositories for {}", repos.len(), self.user);
        let projects = self.collect_projects(repos).await;

        let entry = CacheEntry { timestamp: crate::current_epoch_millis(), data: projects };
        if let Err(e) = self.cache.write_cache(&key, &entry).await {
            warn!("failed to write cache {}: {:#}", key, e);
        }
        info!("Acquired {} projects", entry.data.len());
        Ok(entry.data)
    }

    pub async fn cache_status(&self) -> CacheStatus {
        self.cache.status(&self.cache_key(), crate::current_epoch_millis(), self.cache_ttl).await
    }

    pub async fn clear_cache(&self) -> Result<u64> { self.cache.clear(&self.cache_key()).await }

    async fn collect_projects(&self, repos: Vec<RepoSummary>) -> Vec<ProjectRecord> {
        // `buffered` yields in input order regardless of completion order.
        let results: Vec<Option<ProjectRecord>> = stream::iter(repos)
            .map(|repo| async move {
                match self.build_project(&repo).await {
                    Ok(project) => project,
                    Err(e) => {
                        warn!("skipping {}: {:#}", repo.name, e);
                        None
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;
        results.into_iter().flatten().collect()
    }

    /// `Ok(None)` for repositories that are simply not portfolio projects.
    async fn build_project(&self, repo: &RepoSummary) -> Result<Option<ProjectRecord>> {
        let contents = self.host.list_contents(&repo.owner.login, &repo.name).await?;
        let Some(manifest_file) = contents.iter().find(|f| f.name == MANIFEST_FILE) else {
            debug!("{} has no {}", repo.name, MANIFEST_FILE);
            return Ok(None);
        };
        let readme_file = contents.iter().find(|f| f.name.eq_ignore_ascii_case(README_FILE));

        let manifest_url = manifest_file
            .download_url
            .as_deref()
            .ok_or_else(|| anyhow!("{} has no download url", MANIFEST_FILE))?;
        let manifest_text = self.host.fetch_text(manifest_url).await?;
        let manifest: Manifest = serde_json::from_str(&manifest_text)
            .with_context(|| format!("parsing {}", MANIFEST_FILE))?;

        let documentation_text = match readme_file.and_then(|f| f.download_url.as_deref()) {
            Some(url) => self.host.fetch_text(url).await.context("downloading readme")?,
            None => String::new(),
        };

        let title = extract_title(&documentation_text).unwrap_or_else(|| repo.name.clone());
        let description = extract_description(Some(&documentation_text));
        let thumbnail_url = manifest.thumbnail_url().unwrap_or(THUMBNAIL_PLACEHOLDER).to_string();

        Ok(Some(ProjectRecord {
            repo_name: repo.name.clone(),
            title,
            description,
            thumbnail_url,
            media: manifest.list,
            documentation_text,
            repo_url: repo.html_url.clone(),
            homepage_url: repo.homepage.clone().filter(|h| !h.trim().is_empty()),
            updated_at: repo.pushed_at.clone(),
        }))
    }
}

/// Rejects a second pass while one is running; released on drop.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            bail!("project refresh already in progress");
        }
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::Release); }
}
