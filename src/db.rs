use anyhow::{Context, Result};
use directories::ProjectDirs;
use sqlx::{any::AnyConnectOptions, AnyPool, ConnectOptions, migrate::Migrator};
use sqlx::any::AnyPoolOptions;
use std::{path::PathBuf, str::FromStr};
use std::sync::Once;

use crate::storage::Storage;

// Ensure drivers are installed exactly once for sqlx::any
static INSTALL_DRIVERS: Once = Once::new();

// Embed SQL migrations from the migrations/ directory
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    // Create a connection pool. If database_url is None, use a SQLite file in the
    // user's data directory.
    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let url = match database_url {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => default_sqlite_url()?,
        };

        let opts = AnyConnectOptions::from_str(&url)
            .with_context(|| format!("invalid database URL: {url}"))?;
        // Quiet by default; callers can enable SQLX_LOG if they want
        let opts = opts.disable_statement_logging();

        // One writer is plenty for a single cache slot.
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .with_context(|| format!("failed to connect to database: {url}"))?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        match MIGRATOR.run(&self.pool).await {
            Ok(_) => Ok(()),
            Err(e) => {
                let msg = e.to_string();
                let looks_modified = msg.contains("was previously applied but has been modified");
                let duplicate_version = msg.contains("UNIQUE constraint failed: _sqlx_migrations.version");
                if looks_modified || duplicate_version {
                    let _ = sqlx::query("DELETE FROM _sqlx_migrations").execute(&self.pool).await;
                    MIGRATOR.run(&self.pool).await.context("running migrations after ledger reset")
                } else {
                    Err(e).context("running migrations")
                }
            }
        }
    }

    pub fn pool(&self) -> &AnyPool { &self.pool }
}

#[async_trait::async_trait]
impl Storage for Database {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query_scalar::<_, String>(
            "SELECT payload FROM portfolio_cache WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn put_value(&self, key: &str, payload: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO portfolio_cache(key, payload, updated_at) VALUES (?, ?, ?)\n             ON CONFLICT(key) DO UPDATE SET payload=excluded.payload, updated_at=excluded.updated_at",
        )
        .bind(key)
        .bind(payload)
        .bind(crate::current_epoch_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_value(&self, key: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM portfolio_cache WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// `sqlite://` URL for a file path, creating the file so SQLite can open it read-write.
pub fn sqlite_url_for(path: &std::path::Path) -> Result<String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating db parent dir: {}", parent.display()))?;
    }
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path);

    // Encode spaces in the path for a valid sqlite URL
    let mut path_str = path.to_string_lossy().to_string();
    if path_str.contains(' ') { path_str = path_str.replace(' ', "%20"); }
    Ok(format!("sqlite://{path_str}?mode=rwc"))
}

fn default_sqlite_url() -> Result<String> {
    let proj = ProjectDirs::from("dev", "showcase", "showcase")
        .context("unable to determine data directory for default sqlite path")?;
    let mut path: PathBuf = proj.data_dir().to_path_buf();
    path.push("showcase.db");
    sqlite_url_for(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_db(dir: &tempfile::TempDir) -> Database {
        let url = sqlite_url_for(&dir.path().join("cache.db")).unwrap();
        let db = Database::connect(Some(&url)).await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    #[tokio::test]
    async fn put_get_overwrite_delete() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_db(&dir).await;
        assert_eq!(db.get_value("portfolio_v2_u").await.unwrap(), None);
        db.put_value("portfolio_v2_u", "{\"a\":1}").await.unwrap();
        db.put_value("portfolio_v2_u", "{\"a\":2}").await.unwrap();
        assert_eq!(db.get_value("portfolio_v2_u").await.unwrap().as_deref(), Some("{\"a\":2}"));
        assert_eq!(db.delete_value("portfolio_v2_u").await.unwrap(), 1);
        assert_eq!(db.get_value("portfolio_v2_u").await.unwrap(), None);
    }

    #[tokio::test]
    async fn migrations_are_idempotent_and_data_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = temp_db(&dir).await;
            db.put_value("k", "v").await.unwrap();
        }
        let db = temp_db(&dir).await;
        assert_eq!(db.get_value("k").await.unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn sqlite_url_escapes_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let url = sqlite_url_for(&dir.path().join("with space").join("c.db")).unwrap();
        assert!(url.starts_with("sqlite://"));
        assert!(url.contains("with%20space"));
        assert!(url.ends_with("?mode=rwc"));
    }
}
