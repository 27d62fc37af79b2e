use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::{Error, Result};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClassnotesConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// REST table API endpoint and service key
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            static_dir: Some("frontend/static".to_string()),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ClassnotesConfig {
    /// Overlay environment variables on top of file values
    pub fn apply_env<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| get(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("SUPABASE_URL") {
            self.store.url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_KEY") {
            self.store.key = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Store URL and key, or a config error naming what is missing
    pub fn store_credentials(&self) -> Result<(&str, &str)> {
        match (self.store.url.as_deref(), self.store.key.as_deref()) {
            (Some(url), Some(key)) => Ok((url, key)),
            _ => Err(Error::Config(
                "Set SUPABASE_URL and SUPABASE_KEY (or [store] url/key in the config file).".into(),
            )),
        }
    }

    pub fn llm_api_key(&self) -> Result<&str> {
        self.llm
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY not set".into()))
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("classnotes.toml")
}

/// Read the config file if present, then apply `.env` and the process environment
pub fn load_config(path: Option<&Path>) -> Result<ClassnotesConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("invalid config {}: {}", path.display(), e)))?
    } else {
        ClassnotesConfig::default()
    };

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Failed to load .env: {}", e);
        }
    }

    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
}

pub fn write_config(path: &Path, config: &ClassnotesConfig, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("failed to render config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
