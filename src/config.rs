use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_JWT_TTL_SECS: u64 = 60 * 60 * 24;
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_PG_POOL_MAX: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    pub media_root: PathBuf,
    pub max_body_bytes: usize,
    pub storage: StorageBackend,
    /// `ADMIN_USERNAME` / `ADMIN_PASSWORD`, bootstrapped as a staff account.
    pub admin: Option<(String, String)>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT is not a port number: {}", raw))?,
            None => DEFAULT_PORT,
        };
        let jwt_ttl_secs = match get("JWT_TTL_SECS") {
            Some(raw) => raw.parse().with_context(|| format!("JWT_TTL_SECS is invalid: {}", raw))?,
            None => DEFAULT_JWT_TTL_SECS,
        };
        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(raw) => raw.parse().with_context(|| format!("MAX_BODY_BYTES is invalid: {}", raw))?,
            None => DEFAULT_MAX_BODY_BYTES,
        };
        let storage = match get("STORAGE").as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => bail!("STORAGE must be `postgres` or `memory`, got `{}`", other),
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        };

        Ok(Self {
            port,
            allowed_origins,
            jwt_secret: get("JWT_SECRET").context("JWT_SECRET not set")?,
            jwt_ttl_secs,
            media_root: PathBuf::from(get("MEDIA_ROOT").unwrap_or_else(|| DEFAULT_MEDIA_ROOT.into())),
            max_body_bytes,
            storage,
            admin,
        })
    }
}

pub fn get_pg_pool() -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(env::var("PG_HOST").context("PG_HOST not set")?);
    cfg.user = Some(env::var("PG_USER").context("PG_USER not set")?);
    cfg.password = env::var("PG_PASS").ok();
    cfg.dbname = Some(env::var("PG_DB").context("PG_DB not set")?);
    if let Ok(port) = env::var("PG_PORT") {
        cfg.port = Some(port.parse().with_context(|| format!("PG_PORT is invalid: {}", port))?);
    }

    let max_size = match env::var("PG_POOL_MAX") {
        Ok(raw) => raw.parse().with_context(|| format!("PG_POOL_MAX is invalid: {}", raw))?,
        Err(_) => DEFAULT_PG_POOL_MAX,
    };
    let mut pool_cfg = cfg.pool.unwrap_or_default();
    pool_cfg.max_size = max_size;
    cfg.pool = Some(pool_cfg);

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .context("failed to create postgres pool")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let s = settings(&[("JWT_SECRET", "s")]).unwrap();
        assert_eq!(s.port, DEFAULT_PORT);
        assert_eq!(s.storage, StorageBackend::Postgres);
        assert_eq!(s.allowed_origins.len(), 2);
        assert_eq!(s.media_root, PathBuf::from("media"));
        assert!(s.admin.is_none());
    }

    #[test]
    fn jwt_secret_is_required() {
        assert!(settings(&[]).is_err());
        assert!(settings(&[("JWT_SECRET", "  ")]).is_err());
    }

    #[test]
    fn parses_overrides() {
        let s = settings(&[
            ("JWT_SECRET", "s"),
            ("PORT", "9000"),
            ("STORAGE", "memory"),
            ("ALLOWED_ORIGINS", "https://blog.example, ,https://admin.example"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "pw"),
        ])
        .unwrap();
        assert_eq!(s.port, 9000);
        assert_eq!(s.storage, StorageBackend::Memory);
        assert_eq!(s.allowed_origins, vec!["https://blog.example", "https://admin.example"]);
        assert_eq!(s.admin, Some(("root".to_string(), "pw".to_string())));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(settings(&[("JWT_SECRET", "s"), ("PORT", "http")]).is_err());
        assert!(settings(&[("JWT_SECRET", "s"), ("STORAGE", "sqlite")]).is_err());
    }
}
