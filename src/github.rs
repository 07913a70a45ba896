//! GitHub REST access used by the acquisition pass.
//!
//! Only three calls are needed: the owner's repository list, a repository's root
//! listing, and raw file downloads.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// Subset of a repository object from `/users/{user}/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub owner: RepoOwner,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub pushed_at: Option<String>,
}

/// One entry of `/repos/{owner}/{repo}/contents/`. Directories have no `download_url`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Repositories owned by `user`, most recently updated first.
    async fn list_repos(&self, user: &str) -> Result<Vec<RepoSummary>>;
    /// Root listing; an unsuccessful status or a non-list body reads as empty.
    async fn list_contents(&self, owner: &str, repo: &str) -> Result<Vec<ContentEntry>>;
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

pub struct GitHubClient {
    http: reqwest::Client,
    api_base: Url,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        if let Some(token) = config.token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).context("invalid token")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("showcase/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);
        if let Some(t) = config.request_timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build()?;

        // Url::join drops the last path segment unless the base ends with '/'.
        let mut base = config.api_base.clone();
        if !base.ends_with('/') { base.push('/'); }
        let api_base = Url::parse(&base).with_context(|| format!("invalid api_base: {}", config.api_base))?;
        Ok(Self { http, api_base })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base.join(path).with_context(|| format!("building url for {path}"))
    }
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn list_repos(&self, user: &str) -> Result<Vec<RepoSummary>> {
        let mut url = self.endpoint(&format!("users/{user}/repos"))?;
        url.query_pairs_mut().append_pair("type", "owner").append_pair("sort", "updated");
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.context("requesting repository list")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("GitHub API returned {} for the repository list", status);
        }
        resp.json::<Vec<RepoSummary>>().await.context("decoding repository list")
    }

    async fn list_contents(&self, owner: &str, repo: &str) -> Result<Vec<ContentEntry>> {
        let url = self.endpoint(&format!("repos/{owner}/{repo}/contents/"))?;
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.with_context(|| format!("listing {owner}/{repo}"))?;
        if resp.status() != reqwest::StatusCode::OK {
            debug!("{}/{} contents returned {}", owner, repo, resp.status());
            return Ok(Vec::new());
        }
        let body: serde_json::Value = resp.json().await.with_context(|| format!("decoding {owner}/{repo} listing"))?;
        if !body.is_array() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let url = Url::parse(url).map_err(|e| anyhow!("invalid download url {url}: {e}"))?;
        debug!("GET {}", url);
        let resp = self.http.get(url.clone()).send().await.with_context(|| format!("downloading {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("download of {} returned {}", url, status);
        }
        resp.text().await.with_context(|| format!("reading {url}"))
    }
}
