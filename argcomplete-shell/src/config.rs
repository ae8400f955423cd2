//! Configuration file support for the completion responder.
//!
//! - Forward-compatible: unknown fields are ignored.
//! - Graceful degradation: parse errors are logged but never prevent the
//!   responder from answering with the shell-wrapper-supplied defaults.
//! - Layered configuration: defaults < config file < environment contract.

use etcetera::BaseStrategy;
use std::path::{Path, PathBuf};

/// Root configuration structure for the completion responder.
///
/// All fields are optional to support forward compatibility and partial
/// configuration. Unknown fields in the TOML file are silently ignored.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion-finder behavior options.
    pub completion: CompletionConfig,
}

/// Completion-finder behavior options.
#[derive(Debug, Default, Clone, serde::Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Offer an active optional's own flag spellings even when its prefix
    /// doesn't yet look like an option token.
    #[serde(rename = "always-complete-options")]
    pub always_complete_options: Option<bool>,

    /// Append a trailing space after a unique, non-continuation-ending
    /// candidate. The shell wrapper's `_ARGCOMPLETE_SUPPRESS_SPACE` always
    /// overrides this when set.
    #[serde(rename = "append-space")]
    pub append_space: Option<bool>,
}

impl Config {
    /// Whether to offer option spellings regardless of prefix shape,
    /// honoring the config file but falling back to the hardcoded default.
    ///
    /// Defaults to `true`, matching `original_source/argcomplete/__init__.py`'s
    /// own `autocomplete(..., always_complete_options=True)` default.
    #[must_use]
    pub fn always_complete_options(&self) -> bool {
        self.completion.always_complete_options.unwrap_or(true)
    }

    /// Whether a trailing space should be appended after a unique
    /// candidate, absent an explicit override from the shell wrapper.
    #[must_use]
    pub fn append_space(&self) -> bool {
        self.completion.append_space.unwrap_or(true)
    }
}

/// Result of attempting to load a configuration file.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration, or default if loading failed.
    pub config: Config,
    /// The path that was used (or attempted) for loading.
    pub path: Option<PathBuf>,
    /// Any error that occurred during loading.
    pub error: Option<ConfigLoadError>,
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigLoadError {
    /// Failed to read the configuration file.
    Io(std::io::Error),
    /// Failed to parse the TOML content.
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

/// Returns the default configuration file path for the current platform,
/// following the XDG Base Directory specification on Linux/macOS and
/// appropriate conventions elsewhere via the `etcetera` crate.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("argcomplete-rs").join("config.toml"))
}

/// Loads configuration from the specified path.
#[must_use]
pub fn load_from_path(path: &Path) -> ConfigLoadResult {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            return ConfigLoadResult {
                config: Config::default(),
                path: Some(path.to_path_buf()),
                error: Some(ConfigLoadError::Io(e)),
            };
        }
    };

    match toml::from_str(&content) {
        Ok(config) => ConfigLoadResult {
            config,
            path: Some(path.to_path_buf()),
            error: None,
        },
        Err(e) => ConfigLoadResult {
            config: Config::default(),
            path: Some(path.to_path_buf()),
            error: Some(ConfigLoadError::Parse(e)),
        },
    }
}

/// Loads configuration from the default platform path, returning defaults
/// silently if no file exists there.
#[must_use]
pub fn load_default() -> ConfigLoadResult {
    let Some(path) = default_config_path() else {
        return ConfigLoadResult {
            config: Config::default(),
            path: None,
            error: None,
        };
    };

    if !path.exists() {
        return ConfigLoadResult {
            config: Config::default(),
            path: Some(path),
            error: None,
        };
    }

    load_from_path(&path)
}
