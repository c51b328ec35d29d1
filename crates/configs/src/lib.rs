use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// `development` exposes error details in 500 responses.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Optional directory with the public site, served for unmatched paths.
    #[serde(default)]
    pub static_dir: Option<String>,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            environment: default_environment(),
            static_dir: None,
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Azure,
    File,
    Memory,
}

impl StorageBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "azure" => Ok(Self::Azure),
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("storage.backend must be one of azure|file|memory, got {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_account_name")]
    pub account_name: String,
    #[serde(default)]
    pub account_key: Option<String>,
    /// Overrides `https://<account>.blob.core.windows.net`, e.g. for Azurite.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_container")]
    pub container: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_true")]
    pub conditional_writes: bool,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub blobs: BlobNames,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            account_name: default_account_name(),
            account_key: None,
            endpoint: None,
            container: default_container(),
            data_dir: default_data_dir(),
            conditional_writes: true,
            request_timeout_secs: default_timeout(),
            blobs: BlobNames::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlobNames {
    #[serde(default = "default_board_blob")]
    pub board_members: String,
    #[serde(default = "default_impact_blob")]
    pub impact_goals: String,
    #[serde(default = "default_naming_blob")]
    pub naming_opportunities: String,
}

impl Default for BlobNames {
    fn default() -> Self {
        Self {
            board_members: default_board_blob(),
            impact_goals: default_impact_blob(),
            naming_opportunities: default_naming_blob(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { admin_password: default_admin_password() }
    }
}

fn default_environment() -> String { "production".into() }
fn default_log_format() -> String { "compact".into() }
fn default_backend() -> StorageBackend { StorageBackend::Azure }
fn default_account_name() -> String { "harambeedata".into() }
fn default_container() -> String { "board-data".into() }
fn default_data_dir() -> String { "data".into() }
fn default_true() -> bool { true }
fn default_timeout() -> u64 { 30 }
fn default_board_blob() -> String { "board-data.json".into() }
fn default_impact_blob() -> String { "impact-goals-data.json".into() }
fn default_naming_blob() -> String { "naming-opportunities.json".into() }
fn default_admin_password() -> String { "12345".into() }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is missing, then apply environment overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_with(&path, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load_and_validate`] with an explicit file path and
    /// environment lookup.
    pub fn load_with<F>(path: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = if std::path::Path::new(path).exists() {
            load_from_file(path)?
        } else {
            AppConfig::default()
        };
        cfg.apply_env(lookup)?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT must be a port number, got {port:?}"))?;
        }
        if let Some(threads) = get("TOKIO_WORKER_THREADS").and_then(|v| v.trim().parse().ok()) {
            self.server.worker_threads = Some(threads);
        }
        if let Some(env) = get("APP_ENV").or_else(|| get("NODE_ENV")) {
            self.server.environment = env;
        }
        if let Some(dir) = get("STATIC_DIR") {
            self.server.static_dir = Some(dir);
        }
        if let Some(format) = get("LOG_FORMAT") {
            self.server.log_format = format;
        }

        if let Some(backend) = get("STORAGE_BACKEND") {
            self.storage.backend = StorageBackend::parse(&backend)?;
        }
        if let Some(name) = get("STORAGE_ACCOUNT_NAME") {
            self.storage.account_name = name;
        }
        if let Some(key) = get("STORAGE_ACCOUNT_KEY") {
            self.storage.account_key = Some(key);
        }
        if let Some(endpoint) = get("STORAGE_ENDPOINT") {
            self.storage.endpoint = Some(endpoint);
        }
        if let Some(container) = get("CONTAINER_NAME") {
            self.storage.container = container;
        }
        if let Some(dir) = get("STORAGE_DATA_DIR") {
            self.storage.data_dir = dir;
        }
        if let Some(blob) = get("BLOB_NAME") {
            self.storage.blobs.board_members = blob;
        }
        if let Some(blob) = get("IMPACT_GOALS_BLOB_NAME") {
            self.storage.blobs.impact_goals = blob;
        }
        if let Some(blob) = get("NAMING_OPPORTUNITIES_BLOB_NAME") {
            self.storage.blobs.naming_opportunities = blob;
        }

        if let Some(password) = get("ADMIN_PASSWORD") {
            self.auth.admin_password = password;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.server.environment.eq_ignore_ascii_case("development")
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.container.trim().is_empty() {
            return Err(anyhow!("storage.container must not be empty"));
        }
        let blobs = [
            &self.blobs.board_members,
            &self.blobs.impact_goals,
            &self.blobs.naming_opportunities,
        ];
        if blobs.iter().any(|b| b.trim().is_empty()) {
            return Err(anyhow!("storage.blobs entries must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("storage.request_timeout_secs must be positive"));
        }
        Ok(())
    }

    /// Account key with surrounding whitespace removed; `None` when unset.
    pub fn account_key(&self) -> Option<&str> {
        self.account_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn endpoint(&self) -> String {
        match self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(e) => e.trim_end_matches('/').to_string(),
            None => format!("https://{}.blob.core.windows.net", self.account_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_match_deployed_function_settings() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.storage.account_name, "harambeedata");
        assert_eq!(cfg.storage.container, "board-data");
        assert_eq!(cfg.storage.blobs.board_members, "board-data.json");
        assert_eq!(cfg.storage.blobs.impact_goals, "impact-goals-data.json");
        assert_eq!(cfg.storage.blobs.naming_opportunities, "naming-opportunities.json");
        assert_eq!(cfg.auth.admin_password, "12345");
        assert_eq!(cfg.storage.backend, StorageBackend::Azure);
        assert!(cfg.storage.conditional_writes);
        assert!(cfg.storage.account_key().is_none());
    }

    #[test]
    fn env_overrides_apply() -> Result<()> {
        let vars = env(&[
            ("STORAGE_ACCOUNT_KEY", "  a2V5  "),
            ("STORAGE_BACKEND", "File"),
            ("IMPACT_GOALS_BLOB_NAME", "goals.json"),
            ("NODE_ENV", "development"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("SERVER_PORT", "9090"),
            ("BLOB_NAME", ""),
        ]);
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| vars.get(k).cloned())?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.storage.account_key(), Some("a2V5"));
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.blobs.impact_goals, "goals.json");
        assert_eq!(cfg.storage.blobs.board_members, "board-data.json");
        assert_eq!(cfg.auth.admin_password, "hunter2");
        assert_eq!(cfg.server.port, 9090);
        assert!(cfg.is_development());
        Ok(())
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let vars = env(&[("STORAGE_BACKEND", "s3")]);
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn toml_file_is_parsed_with_defaults() -> Result<()> {
        let path = std::env::temp_dir().join(format!("configs_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
[server]
host = ""
port = 8081

[storage]
backend = "memory"
endpoint = "http://127.0.0.1:10000/devstoreaccount1/"

[storage.blobs]
naming_opportunities = "naming.json"
"#,
        )?;
        let mut cfg = load_from_file(&path.to_string_lossy())?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert_eq!(cfg.storage.endpoint(), "http://127.0.0.1:10000/devstoreaccount1");
        assert_eq!(cfg.storage.blobs.naming_opportunities, "naming.json");
        assert_eq!(cfg.storage.blobs.impact_goals, "impact-goals-data.json");
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn log_format_comes_from_file_unless_overridden() -> Result<()> {
        let path = std::env::temp_dir().join(format!("configs_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nhost = \"0.0.0.0\"\nport = 8080\nlog_format = \"json\"\n")?;
        let path_str = path.to_string_lossy().to_string();

        let cfg = AppConfig::load_with(&path_str, |_| None)?;
        assert_eq!(cfg.server.log_format, "json");

        let vars = env(&[("LOG_FORMAT", "compact")]);
        let cfg = AppConfig::load_with(&path_str, |k| vars.get(k).cloned())?;
        assert_eq!(cfg.server.log_format, "compact");

        let missing = AppConfig::load_with("/nonexistent/config.toml", |_| None)?;
        assert_eq!(missing.server.log_format, "compact");
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn azure_endpoint_derives_from_account() {
        let cfg = StorageConfig::default();
        assert_eq!(cfg.endpoint(), "https://harambeedata.blob.core.windows.net");
    }
}
