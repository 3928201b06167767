//! Configuration schema for codescope.
//!
//! Configuration is read from YAML. Every key is optional; missing keys take
//! the defaults below.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::language::Language;

/// Config file names searched in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["codescope.yaml", ".codescope.yaml"];

/// Environment variable that overrides `api_key`.
pub const API_KEY_ENV: &str = "CODESCOPE_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Provider endpoint, e.g. "https://analysis.internal/api"
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer credential sent to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-attempt deadline in milliseconds (default: 30000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub sample: SampleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_ms: default_timeout_ms(),
            retry: RetryConfig::default(),
            analysis: AnalysisConfig::default(),
            sample: SampleConfig::default(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a config from YAML text. An empty document yields the defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Retry policy for provider calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff in milliseconds; attempt n waits base * n (default: 1000)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

/// Input constraints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Maximum code length in characters (default: 50000)
    #[serde(default = "default_max_code_length")]
    pub max_code_length: usize,
    /// Language tags accepted for analysis (default: every known language)
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_code_length: default_max_code_length(),
            supported_languages: default_supported_languages(),
        }
    }
}

fn default_max_code_length() -> usize {
    50_000
}

fn default_supported_languages() -> Vec<String> {
    Language::ALL.iter().map(|l| l.as_str().to_string()).collect()
}

impl AnalysisConfig {
    /// The configured languages that are known. Unknown tags are dropped here
    /// and reported by [`validate`].
    pub fn supported(&self) -> BTreeSet<Language> {
        self.supported_languages
            .iter()
            .filter_map(|tag| Language::parse(tag))
            .collect()
    }

    pub fn is_supported(&self, language: Language) -> bool {
        self.supported().contains(&language)
    }
}

/// Settings for the in-process sample provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SampleConfig {
    /// Simulated analysis delay in milliseconds (default: 1500)
    #[serde(default = "default_sample_delay_ms")]
    pub delay_ms: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_sample_delay_ms(),
        }
    }
}

fn default_sample_delay_ms() -> u64 {
    1500
}

/// Look for a config file in the working directory, then in the user's
/// config directory.
pub fn discover() -> Option<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Some(path);
        }
    }

    let dirs = ProjectDirs::from("", "", "codescope")?;
    let path = dirs.config_dir().join("config.yaml");
    path.exists().then_some(path)
}

/// Load the config at `path`, or the discovered one, or the defaults.
pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(p) => Config::parse_file(p)
            .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?,
        None => match discover() {
            Some(p) => {
                tracing::debug!("using config {}", p.display());
                Config::parse_file(&p)
                    .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?
            }
            None => Config::default(),
        },
    };
    Ok(config.with_env_overrides())
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.timeout_ms == 0 {
        anyhow::bail!("timeout_ms must be greater than zero");
    }

    if config.analysis.max_code_length == 0 {
        anyhow::bail!("analysis.max_code_length must be greater than zero");
    }

    for tag in &config.analysis.supported_languages {
        if Language::parse(tag).is_none() {
            anyhow::bail!("unknown language {:?} in analysis.supported_languages", tag);
        }
    }

    if config.analysis.supported_languages.is_empty() {
        anyhow::bail!("analysis.supported_languages must not be empty");
    }

    if let Some(url) = &config.base_url {
        reqwest::Url::parse(url).map_err(|e| anyhow::anyhow!("invalid base_url {:?}: {}", url, e))?;
    }

    Ok(())
}
