use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Settings file layout (`showcase.toml`). Every field is optional.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
struct FileConfig {
    user: Option<String>,
    api_base: Option<String>,
    cache_ttl_secs: Option<u64>,
    concurrency: Option<usize>,
    database_url: Option<String>,
    token: Option<String>,
    out_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub user: String,
    pub api_base: String,
    pub cache_ttl: Duration,
    /// Repositories processed at once. 1 keeps the pass strictly sequential.
    pub concurrency: usize,
    pub database_url: Option<String>,
    pub token: Option<String>,
    pub out_dir: PathBuf,
    /// `None` waits on each request indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            cache_ttl: Duration::from_secs(60 * 60),
            concurrency: 1,
            database_url: None,
            token: None,
            out_dir: PathBuf::from("site"),
            request_timeout: None,
        }
    }
}

impl Config {
    /// Load from an explicit file, or the platform config dir, then apply env overrides.
    /// A missing default file is not an error; a missing explicit file or a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Self::read_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::read_file(&p)?,
                _ => FileConfig::default(),
            },
        };
        let mut cfg = Self::default().merge_file(file);
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    fn read_file(p: &Path) -> Result<FileConfig> {
        let text = fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", p.display()))
    }

    /// Parse settings from TOML text without touching the environment.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(text).context("parsing config")?;
        Ok(Self::default().merge_file(file))
    }

    fn merge_file(mut self, f: FileConfig) -> Self {
        if let Some(v) = f.user { self.user = v; }
        if let Some(v) = f.api_base { self.api_base = v; }
        if let Some(v) = f.cache_ttl_secs { self.cache_ttl = Duration::from_secs(v); }
        if let Some(v) = f.concurrency { self.concurrency = v.max(1); }
        if f.database_url.is_some() { self.database_url = f.database_url; }
        if f.token.is_some() { self.token = f.token; }
        if let Some(v) = f.out_dir { self.out_dir = v; }
        if let Some(v) = f.request_timeout_secs { self.request_timeout = (v > 0).then(|| Duration::from_secs(v)); }
        self
    }

    /// Environment overrides, read through `lookup` so tests need not mutate the process env.
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(v) = lookup("SHOWCASE_USER").filter(|s| !s.trim().is_empty()) { self.user = v.trim().to_string(); }
        if let Some(v) = lookup("SHOWCASE_API_BASE").filter(|s| !s.trim().is_empty()) { self.api_base = v; }
        if let Some(v) = lookup("SHOWCASE_CACHE_TTL_SECS").and_then(|s| s.parse().ok()) { self.cache_ttl = Duration::from_secs(v); }
        if let Some(v) = lookup("SHOWCASE_CONCURRENCY").and_then(|s| s.parse::<usize>().ok()) { self.concurrency = v.max(1); }
        if let Some(v) = lookup("GITHUB_TOKEN").filter(|s| !s.trim().is_empty()) { self.token = Some(v); }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            anyhow::bail!("no GitHub user configured; pass --user, set SHOWCASE_USER, or add `user` to showcase.toml");
        }
        url::Url::parse(&self.api_base).with_context(|| format!("invalid api_base: {}", self.api_base))?;
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "showcase", "showcase").map(|p| p.config_dir().join("showcase.toml"))
}
