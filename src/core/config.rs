use anyhow::{Context, Result, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

/// Default environment variable holding the fixer.io access key.
pub const ACCESS_KEY_ENV: &str = "FIXER_ACCESS_KEY";

pub const DEFAULT_FIXER_BASE_URL: &str = "https://data.fixer.io/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const MAX_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FixerProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Used only when the `access_key_env` variable is unset or blank.
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default = "default_access_key_env")]
    pub access_key_env: String,
    /// Per-request timeout, 1 to `MAX_TIMEOUT_SECS` seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_FIXER_BASE_URL.to_string()
}

fn default_access_key_env() -> String {
    ACCESS_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for FixerProviderConfig {
    fn default() -> Self {
        FixerProviderConfig {
            base_url: default_base_url(),
            access_key: None,
            access_key_env: default_access_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub fixer: FixerProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    /// Keep rates on disk between runs.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_persist() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            persist: default_persist(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the default config file, or defaults when it does not exist yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxrate", "fxrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "fxrate", "fxrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let timeout_secs = self.provider.fixer.timeout_secs;
        ensure!(
            (1..=MAX_TIMEOUT_SECS).contains(&timeout_secs),
            "provider.fixer.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {timeout_secs}"
        );
        Ok(())
    }

    /// Resolves the feed credential, environment first.
    pub fn access_key(&self) -> Result<String> {
        let fixer = &self.provider.fixer;
        Self::resolve_access_key(
            &fixer.access_key_env,
            std::env::var(&fixer.access_key_env).ok(),
            fixer.access_key.as_deref(),
        )
    }

    fn resolve_access_key(
        env_name: &str,
        from_env: Option<String>,
        from_file: Option<&str>,
    ) -> Result<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                from_file
                    .filter(|key| !key.trim().is_empty())
                    .map(str::to_string)
            })
            .with_context(|| {
                format!("No fixer access key configured. Set {env_name} or provider.fixer.access_key")
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.fixer.timeout_secs)
    }
}
