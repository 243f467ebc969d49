//! Configuration module
//!
//! This module provides the filehost configuration: storage location, mount path,
//! public URL pieces, authentication and TLS policy, credential signing and the
//! upload size ceiling. Values are read from the environment (a `.env` file is
//! honoured via `dotenvy`) and validated before use.
//!
//! [`SharedConfig`] holds the live configuration as an immutable snapshot that is
//! swapped atomically on reload, so readers always see one complete config.

use anyhow::Context;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

// Defaults
const SERVER_PORT: u16 = 8080;
const UPLOAD_PATH: &str = "data/uploads";
const MOUNT_PATH: &str = "/upload";
const PUBLIC_HOST: &str = "localhost";
const TOKEN_ISSUER: &str = "filehost";
const TOKEN_TTL_SECS: u64 = 3600;
const TOKEN_TTL_MIN_SECS: u64 = 60;
const TOKEN_TTL_MAX_SECS: u64 = 86_400;
const MAX_UPLOAD_MB: u64 = 10;
const MIN_SECRET_LEN: usize = 32;

/// Filehost configuration
#[derive(Clone, Debug)]
pub struct FilehostConfig {
    pub server_port: u16,
    pub environment: String,
    /// Root directory for stored files
    pub storage_path: PathBuf,
    /// URL path under which upload and retrieval are mounted (leading `/`, no trailing `/`)
    pub mount_path: String,
    pub public_host: String,
    /// Public port; 0 leaves the port out of the public URL
    pub public_port: u16,
    /// Whether the public URL uses https
    pub public_ssl: bool,
    /// Require a credential for uploads
    pub authenticate: bool,
    /// Refuse chat messages carrying filehost URLs over unencrypted connections
    pub require_ssl: bool,
    pub token_secret: String,
    pub token_issuer: String,
    pub token_ttl: Duration,
    pub token_ttl_min: Duration,
    pub token_ttl_max: Duration,
    pub max_upload_bytes: u64,
}

impl FilehostConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration for a reload. Values in `.env` replace the ones
    /// loaded into the process environment at startup.
    pub fn reload_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv_override().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Apply an env file over the process environment, then load configuration.
    pub fn from_env_file(path: &Path) -> Result<Self, anyhow::Error> {
        dotenvy::from_path_override(path)
            .with_context(|| format!("Failed to read env file {}", path.display()))?;
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str, default: bool| {
            get(key)
                .map(|v| parse_bool(&v).unwrap_or(default))
                .unwrap_or(default)
        };
        let secs = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let server_port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let public_port = match get("FILEHOST_PORT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("FILEHOST_PORT must be a valid port number"))?,
            None => 0,
        };

        let max_upload_mb = secs("FILEHOST_MAX_UPLOAD_MB", MAX_UPLOAD_MB);

        let config = FilehostConfig {
            server_port,
            environment: get("ENVIRONMENT")
                .or_else(|| get("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            storage_path: PathBuf::from(
                get("FILEHOST_UPLOAD_PATH").unwrap_or_else(|| UPLOAD_PATH.to_string()),
            ),
            mount_path: normalize_mount_path(
                &get("FILEHOST_URI").unwrap_or_else(|| MOUNT_PATH.to_string()),
            ),
            public_host: get("FILEHOST_HOSTNAME").unwrap_or_else(|| PUBLIC_HOST.to_string()),
            public_port,
            public_ssl: flag("FILEHOST_SSL", true),
            authenticate: flag("FILEHOST_AUTHENTICATE", true),
            require_ssl: flag("FILEHOST_REQUIRE_SSL", true),
            token_secret: get("FILEHOST_TOKEN_SECRET").ok_or_else(|| {
                anyhow::anyhow!("FILEHOST_TOKEN_SECRET must be set for upload credentials")
            })?,
            token_issuer: get("FILEHOST_TOKEN_ISSUER").unwrap_or_else(|| TOKEN_ISSUER.to_string()),
            token_ttl: Duration::from_secs(secs("FILEHOST_TOKEN_TTL_SECS", TOKEN_TTL_SECS)),
            token_ttl_min: Duration::from_secs(secs(
                "FILEHOST_TOKEN_TTL_MIN_SECS",
                TOKEN_TTL_MIN_SECS,
            )),
            token_ttl_max: Duration::from_secs(secs(
                "FILEHOST_TOKEN_TTL_MAX_SECS",
                TOKEN_TTL_MAX_SECS,
            )),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.token_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "FILEHOST_TOKEN_SECRET must be at least {} characters long",
                MIN_SECRET_LEN
            ));
        }

        if self.token_issuer.trim().is_empty() {
            return Err(anyhow::anyhow!("FILEHOST_TOKEN_ISSUER cannot be empty"));
        }

        if self.token_ttl_min.is_zero() || self.token_ttl_min > self.token_ttl_max {
            return Err(anyhow::anyhow!(
                "Token TTL bounds are invalid: min {}s, max {}s",
                self.token_ttl_min.as_secs(),
                self.token_ttl_max.as_secs()
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("FILEHOST_MAX_UPLOAD_MB cannot be 0"));
        }

        if self.mount_path == "/" {
            return Err(anyhow::anyhow!(
                "FILEHOST_URI cannot be the root path; choose a dedicated prefix such as /upload"
            ));
        }

        if self.public_host.contains(['/', ' ']) {
            return Err(anyhow::anyhow!(
                "FILEHOST_HOSTNAME must be a bare host name"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Public base URL of the service, e.g. `https://irc.example.net/upload`.
    ///
    /// This is the value published under the discovery key and the prefix the
    /// link scanner looks for.
    pub fn public_url(&self) -> String {
        let scheme = if self.public_ssl { "https" } else { "http" };
        if self.public_port > 0 {
            format!(
                "{}://{}:{}{}",
                scheme, self.public_host, self.public_port, self.mount_path
            )
        } else {
            format!("{}://{}{}", scheme, self.public_host, self.mount_path)
        }
    }

    /// Public URL of a stored file. The name is percent-encoded so retrieval
    /// and the link scanner decode it back to the stored name.
    pub fn file_url(&self, filename: &str) -> String {
        format!("{}/{}", self.public_url(), urlencoding::encode(filename))
    }

    /// Clamp a requested credential lifetime into the configured bounds.
    pub fn clamp_ttl(&self, ttl: Duration) -> Duration {
        ttl.max(self.token_ttl_min).min(self.token_ttl_max)
    }
}

/// Ensure a leading slash and drop trailing slashes.
fn normalize_mount_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Live configuration shared between the HTTP service and the chat relay.
///
/// The lock only guards the `Arc` swap; callers clone the snapshot out and
/// never hold the lock while doing I/O.
#[derive(Clone, Debug)]
pub struct SharedConfig {
    inner: Arc<RwLock<Arc<FilehostConfig>>>,
}

impl SharedConfig {
    pub fn new(config: FilehostConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Current configuration snapshot.
    pub fn snapshot(&self) -> Arc<FilehostConfig> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Validate and swap in a new configuration. The old snapshot stays live on error.
    pub fn replace(&self, config: FilehostConfig) -> Result<(), anyhow::Error> {
        config.validate()?;
        let next = Arc::new(config);
        match self.inner.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        Ok(())
    }

    /// Re-read `.env` and the environment and swap in the result.
    pub fn reload_from_env(&self) -> Result<(), anyhow::Error> {
        let config = FilehostConfig::reload_env()?;
        self.replace(config)?;
        tracing::info!("Filehost configuration reloaded");
        Ok(())
    }
}
