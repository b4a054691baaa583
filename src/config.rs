//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/wikiclade/wikiclade.toml`
//! 3. Explicit config file given with `--config`
//! 4. Environment variables: `WIKICLADE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::application::ApplicationError;

pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
pub const DEFAULT_SEARCH_PATH: &str = "/w/index.php";

/// Unified configuration for wikiclade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Site root that searches and relative links resolve against
    pub base_url: String,
    /// Path of the search endpoint below `base_url`
    pub search_path: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// How many levels of linked pages are followed (0 = none)
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            search_path: DEFAULT_SEARCH_PATH.into(),
            user_agent: format!("wikiclade/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            max_depth: 0,
        }
    }
}

/// Raw settings for intermediate parsing; `None` means "not specified".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub base_url: Option<String>,
    pub search_path: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_depth: Option<usize>,
}

/// Get the XDG config directory for wikiclade.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "wikiclade").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("wikiclade.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            base_url: overlay
                .base_url
                .clone()
                .unwrap_or_else(|| self.base_url.clone()),
            search_path: overlay
                .search_path
                .clone()
                .unwrap_or_else(|| self.search_path.clone()),
            user_agent: overlay
                .user_agent
                .clone()
                .unwrap_or_else(|| self.user_agent.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// An explicit file must exist; the global file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = explicit {
            debug!("loading config {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Apply WIKICLADE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("WIKICLADE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        let raw: RawSettings = config.try_deserialize().map_err(config_err)?;
        Ok(settings.merge_with(&raw))
    }

    /// Reject settings the document source could not work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let url = Url::parse(&self.base_url).map_err(|e| ApplicationError::Config {
            message: format!("base_url {:?}: {}", self.base_url, e),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApplicationError::Config {
                message: format!("base_url {:?}: expected http or https", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ApplicationError::Config {
                message: "timeout_secs must be positive".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# wikiclade configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/wikiclade/wikiclade.toml
#   File:   --config <FILE>
#   Env:    WIKICLADE_* environment variables (e.g. WIKICLADE_MAX_DEPTH=2)

# Site searched for terms and used to resolve relative links
# base_url = "https://en.wikipedia.org"

# Search endpoint below base_url; the term is sent as ?search=<term>
# search_path = "/w/index.php"

# User-Agent header
# user_agent = "wikiclade"

# Request timeout in seconds
# timeout_secs = 30

# Levels of linked pages followed to expand leaves (0 = off)
# max_depth = 0
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
