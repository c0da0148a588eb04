use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_NAMESPACE, ENDPOINT_ENV, HTTP_TIMEOUT_SECS,
};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// optional settings read from `<config_dir>/kv-edit/config.json`
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// GraphQL endpoint URL
    pub endpoint: Option<String>,

    /// namespace used when none is given on the command line
    pub namespace: Option<String>,

    /// shell command printing a bearer token on stdout
    pub token_command: Option<String>,

    /// author overrides for update mutations
    pub author_name: Option<String>,
    pub author_email: Option<String>,

    /// http timeout
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// load from the default location; a missing file yields the defaults
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid config in {}", path.display()))
    }
}

/// effective connection settings after applying precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub namespace: String,
    pub timeout: Duration,
}

impl Settings {
    /// command line > environment > config file > defaults
    pub fn resolve(
        cli_endpoint: Option<&str>,
        cli_namespace: Option<&str>,
        config: &Config,
    ) -> Result<Self> {
        let env_endpoint = std::env::var(ENDPOINT_ENV).ok();
        Self::resolve_with_env(cli_endpoint, cli_namespace, env_endpoint.as_deref(), config)
    }

    fn resolve_with_env(
        cli_endpoint: Option<&str>,
        cli_namespace: Option<&str>,
        env_endpoint: Option<&str>,
        config: &Config,
    ) -> Result<Self> {
        let endpoint = cli_endpoint
            .or(env_endpoint.filter(|e| !e.trim().is_empty()))
            .or(config.endpoint.as_deref())
            .map(str::trim);
        let Some(endpoint) = endpoint else {
            bail!("no GraphQL endpoint configured (use --endpoint or set {ENDPOINT_ENV})");
        };
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            bail!("endpoint must be an http(s) URL: {endpoint}");
        }

        let namespace = cli_namespace
            .or(config.namespace.as_deref())
            .unwrap_or(DEFAULT_NAMESPACE)
            .to_string();

        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(HTTP_TIMEOUT_SECS));

        Ok(Self {
            endpoint: endpoint.to_string(),
            namespace,
            timeout,
        })
    }
}
