use anyhow::{Context as AnyhowContext, Result};
use context_changes::ApplyOptions;
use context_scanner::ExclusionRuleSet;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "CONTEXT_PATCH_CONFIG";
pub const PROJECT_CONFIG_FILE: &str = ".context-patch.toml";
const USER_CONFIG_DIR: &str = "context-patch";
const USER_CONFIG_FILE: &str = "config.toml";

/// Effective settings for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Copy existing files to `<path>.bak` before overwriting
    pub backup_files: bool,

    pub exclusions: ExclusionRuleSet,

    pub generator: GeneratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_files: true,
            exclusions: ExclusionRuleSet::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

/// External text generator invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program and arguments; the prompt is written to its stdin
    pub command: Vec<String>,
    pub timeout_secs: u64,
    /// Total attempts when the generator reports rate limiting
    pub rate_limit_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            timeout_secs: 120,
            rate_limit_retries: 3,
            initial_backoff_ms: 1000,
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl Config {
    /// Resolve configuration: explicit path, env var, project file, user file, defaults.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            return Self::from_file(path).map(|cfg| (cfg, ConfigSource::File(path.to_path_buf())));
        }
        if let Some(path) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            let path = PathBuf::from(path);
            return Self::from_file(&path).map(|cfg| (cfg, ConfigSource::File(path)));
        }

        let candidates = [
            Some(root.join(PROJECT_CONFIG_FILE)),
            dirs::config_dir().map(|dir| dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE)),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                let cfg = Self::from_file(&path)?;
                return Ok((cfg, ConfigSource::File(path)));
            }
        }

        log::debug!("No config file found, using defaults");
        Ok((Self::default(), ConfigSource::Defaults))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let cfg = Self::from_toml(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(raw)?;
        cfg.exclusions
            .validate()
            .map_err(|msg| anyhow::anyhow!("exclusions: {msg}"))?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn apply_options(&self, no_backup: bool, assume_yes: bool) -> ApplyOptions {
        ApplyOptions {
            backup: self.backup_files && !no_backup,
            require_confirmation: !assume_yes,
        }
    }
}
