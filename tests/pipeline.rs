use pretty_assertions::assert_eq;
use serde_json::json;
use showcase::config::Config;
use showcase::db::{sqlite_url_for, Database};
use showcase::github::GitHubClient;
use showcase::prelude::*;
use showcase::storage::MemoryStorage;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> Config {
    Config { user: "me".into(), api_base: server.uri(), ..Config::default() }
}

fn repo(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "owner": { "login": "me" },
        "html_url": format!("https://github.com/me/{name}"),
        "homepage": if name == "alpha" { json!("https://alpha.example") } else { json!(null) },
        "pushed_at": "2024-04-05T06:07:08Z"
    })
}

async fn mount_repos(server: &MockServer, names: &[&str], expect: u64) {
    Mock::given(method("GET"))
        .and(path("/users/me/repos"))
        .and(query_param("type", "owner"))
        .and(query_param("sort", "updated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(names.iter().map(|n| repo(n)).collect::<Vec<_>>()))
        .expect(expect)
        .mount(server)
        .await;
}

/// Root listing for `name` with each file served under /raw/{name}/{file}.
async fn mount_repo_files(server: &MockServer, name: &str, files: &[(&str, &str)]) {
    let listing: Vec<_> = files
        .iter()
        .map(|(f, _)| json!({ "name": f, "download_url": format!("{}/raw/{}/{}", server.uri(), name, f) }))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/repos/me/{name}/contents/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .mount(server)
        .await;
    for (file, body) in files {
        Mock::given(method("GET"))
            .and(path(format!("/raw/{name}/{file}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(*body))
            .mount(server)
            .await;
    }
}

const MANIFEST: &str = r#"{"list":[{"type":"youtube","url":"yt42"},{"type":"img","url":"https://cdn/shot.png"},{"type":"video","url":"https://cdn/demo.mp4"}]}"#;

#[tokio::test]
async fn repository_without_manifest_is_skipped() {
    let server = MockServer::start().await;
    mount_repos(&server, &["alpha", "beta", "gamma"], 1).await;
    mount_repo_files(&server, "alpha", &[("portfolio.json", MANIFEST), ("README.md", "# Alpha Tool\n\n* fast [docs](https://x) `cli`\n")]).await;
    mount_repo_files(&server, "beta", &[("README.md", "# Beta")]).await;
    mount_repo_files(&server, "gamma", &[("portfolio.json", r#"{"list":[]}"#)]).await;

    let cfg = config(&server);
    let app = Showcase::with_parts(cfg.clone(), Box::new(GitHubClient::new(&cfg).unwrap()), Box::new(MemoryStorage::new()));
    let store = app.load_projects(false).await.unwrap();

    assert_eq!(store.len(), 2);
    let alpha = store.get(0).unwrap();
    assert_eq!(alpha.repo_name, "alpha");
    assert_eq!(alpha.title, "Alpha Tool");
    assert_eq!(alpha.description, "fast");
    assert_eq!(alpha.thumbnail_url, "https://cdn/shot.png");
    assert_eq!(alpha.homepage_url.as_deref(), Some("https://alpha.example"));
    assert_eq!(alpha.media[0], MediaItem::YouTube { id: "yt42".into() });
    assert_eq!(store.get(1).unwrap().repo_name, "gamma");
}

#[tokio::test]
async fn unreachable_contents_are_skipped() {
    let server = MockServer::start().await;
    mount_repos(&server, &["empty-repo", "alpha"], 1).await;
    Mock::given(method("GET"))
        .and(path("/repos/me/empty-repo/contents/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "This repository is empty."})))
        .mount(&server)
        .await;
    mount_repo_files(&server, "alpha", &[("portfolio.json", MANIFEST)]).await;

    let cfg = config(&server);
    let app = Showcase::with_parts(cfg.clone(), Box::new(GitHubClient::new(&cfg).unwrap()), Box::new(MemoryStorage::new()));
    let store = app.load_projects(false).await.unwrap();
    let names: Vec<_> = store.records().iter().map(|r| r.repo_name.as_str()).collect();
    assert_eq!(names, ["alpha"]);
}

#[tokio::test]
async fn repository_list_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me/repos"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "API rate limit exceeded"})))
        .mount(&server)
        .await;

    let cfg = config(&server);
    let app = Showcase::with_parts(cfg.clone(), Box::new(GitHubClient::new(&cfg).unwrap()), Box::new(MemoryStorage::new()));
    assert!(app.load_projects(false).await.is_err());
    assert!(!app.cache_status().await.has_entry);
}

async fn open_sqlite(url: &str, cfg: &Config) -> Showcase {
    let db = Database::connect(Some(url)).await.unwrap();
    db.run_migrations().await.unwrap();
    Showcase::with_parts(cfg.clone(), Box::new(GitHubClient::new(cfg).unwrap()), Box::new(db))
}

#[tokio::test]
async fn sqlite_cache_serves_second_run_without_network() {
    let server = MockServer::start().await;
    mount_repos(&server, &["alpha"], 1).await;
    mount_repo_files(&server, "alpha", &[("portfolio.json", MANIFEST), ("readme.md", "# Alpha")]).await;

    let dir = tempfile::tempdir().unwrap();
    let url = sqlite_url_for(&dir.path().join("cache.db")).unwrap();
    let cfg = Config { database_url: Some(url.clone()), ..config(&server) };

    let first = open_sqlite(&url, &cfg).await.load_projects(false).await.unwrap();
    let second = open_sqlite(&url, &cfg).await.load_projects(false).await.unwrap();
    assert_eq!(first, second);

    let app = open_sqlite(&url, &cfg).await;
    let status = app.cache_status().await;
    assert!(status.is_fresh);
    assert_eq!(status.project_count, Some(1));
    assert_eq!(app.clear_cache().await.unwrap(), 1);
}

#[tokio::test]
async fn built_site_links_cards_to_gallery_pages() {
    let server = MockServer::start().await;
    mount_repos(&server, &["alpha"], 1).await;
    mount_repo_files(&server, "alpha", &[("portfolio.json", MANIFEST)]).await;

    let out = tempfile::tempdir().unwrap();
    let cfg = Config { out_dir: out.path().to_path_buf(), ..config(&server) };
    let app = Showcase::with_parts(cfg.clone(), Box::new(GitHubClient::new(&cfg).unwrap()), Box::new(MemoryStorage::new()));
    let store = app.load_projects(false).await.unwrap();
    let pages = app.site_writer().write_site(&store).await.unwrap();
    assert_eq!(pages, 4);

    let index = std::fs::read_to_string(out.path().join("index.html")).unwrap();
    assert_eq!(index.matches("class=\"project-card\"").count(), 1);
    assert!(index.contains("href=\"project-0.html\""));
    let detail = std::fs::read_to_string(out.path().join("project-0.html")).unwrap();
    assert!(detail.contains("<iframe"));
    assert!(detail.contains("No README file."));
}
