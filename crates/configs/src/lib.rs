use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

/// Where the per-user key-value blob lives and which keys it uses.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_ledger_key")]
    pub ledger_key: String,
    #[serde(default = "default_users_key")]
    pub users_key: String,
    #[serde(default = "default_session_key")]
    pub session_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            ledger_key: default_ledger_key(),
            users_key: default_users_key(),
            session_key: default_session_key(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    #[serde(default = "default_fallback_path")]
    pub fallback_path: PathBuf,
    /// Unset means the primary request may hang indefinitely before fallback.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self { primary_url: default_primary_url(), fallback_path: default_fallback_path(), request_timeout_secs: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for ViewConfig {
    fn default() -> Self { Self { per_page: default_per_page() } }
}

fn default_data_file() -> PathBuf { PathBuf::from("data/local_storage.json") }
fn default_ledger_key() -> String { "publicapis_localEdits_v1".into() }
fn default_users_key() -> String { "users".into() }
fn default_session_key() -> String { "currentUser".into() }
fn default_primary_url() -> String { "https://api.publicapis.org/entries".into() }
fn default_fallback_path() -> PathBuf { PathBuf::from("resources.json") }
fn default_per_page() -> usize { 10 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 空白键名回落到默认值，再检查冲突
        self.storage.normalize();
        self.storage.validate()?;
        self.remote.normalize();
        self.remote.validate()?;
        self.view.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    fn normalize(&mut self) {
        if self.ledger_key.trim().is_empty() { self.ledger_key = default_ledger_key(); }
        if self.users_key.trim().is_empty() { self.users_key = default_users_key(); }
        if self.session_key.trim().is_empty() { self.session_key = default_session_key(); }
        if self.data_file.as_os_str().is_empty() { self.data_file = default_data_file(); }
    }

    pub fn validate(&self) -> Result<()> {
        let keys = [&self.ledger_key, &self.users_key, &self.session_key];
        for (i, a) in keys.iter().enumerate() {
            if keys[i + 1..].contains(a) {
                return Err(anyhow!("storage keys must be distinct; `{a}` is used twice"));
            }
        }
        Ok(())
    }
}

impl RemoteConfig {
    fn normalize(&mut self) {
        if self.primary_url.trim().is_empty() { self.primary_url = default_primary_url(); }
        if self.fallback_path.as_os_str().is_empty() { self.fallback_path = default_fallback_path(); }
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.primary_url)
            .map_err(|e| anyhow!("remote.primary_url is not a valid URL: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("remote.primary_url must use http or https"));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(anyhow!("remote.request_timeout_secs must be positive when set"));
        }
        Ok(())
    }
}

impl ViewConfig {
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            return Err(anyhow!("view.per_page must be >= 1"));
        }
        Ok(())
    }
}
