//! Configuration loading and settings resolution
//!
//! Every setting resolves with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Overrides the config file location
pub const CONFIG_PATH_ENV_VAR: &str = "FINGERPRINTER_CONFIG";
/// AcoustID application key
pub const ACOUSTID_API_KEY_ENV_VAR: &str = "FINGERPRINTER_ACOUSTID_API_KEY";
/// Contact address sent in the MusicBrainz User-Agent
pub const CONTACT_EMAIL_ENV_VAR: &str = "FINGERPRINTER_CONTACT_EMAIL";
/// Path to the fpcalc binary
pub const FPCALC_ENV_VAR: &str = "FINGERPRINTER_FPCALC";

/// Compiled defaults used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub app_name: String,
    pub app_version: String,
    pub fpcalc_path: PathBuf,
    pub max_workers: usize,
    pub musicbrainz_delay_ms: u64,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            app_name: "fingerprinter".to_string(),
            app_version: "0.0.1".to_string(),
            fpcalc_path: PathBuf::from("fpcalc"),
            max_workers: 8,
            // MusicBrainz allows one request per second
            musicbrainz_delay_ms: 1000,
            log_level: "info".to_string(),
        }
    }
}

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing directive (e.g. "info", "fingerprinter=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: CompiledDefaults::default().log_level,
        }
    }
}

/// Contents of `config.toml`
///
/// All fields are optional so that a partial file still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub acoustid_api_key: Option<String>,
    pub contact_email: Option<String>,
    pub app_name: Option<String>,
    pub app_version: Option<String>,
    pub fpcalc_path: Option<PathBuf>,
    pub max_workers: Option<usize>,
    pub musicbrainz_delay_ms: Option<u64>,
    pub logging: LoggingConfig,
}

/// Location of the config file
///
/// `FINGERPRINTER_CONFIG` wins over `<config dir>/fingerprinter/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("fingerprinter").join("config.toml"))
}

/// Load a TOML config file
///
/// A missing file yields the defaults. A file that exists but cannot be read
/// is `Error::Io`; one that does not parse is `Error::Config`.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Resolve a string setting: CLI → ENV → TOML
///
/// Empty or whitespace-only values are treated as absent at every tier.
pub fn resolve_setting(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
) -> Option<String> {
    if let Some(value) = cli_arg.filter(|v| is_valid_key(v)) {
        return Some(value.to_string());
    }

    if let Ok(value) = std::env::var(env_var_name) {
        if is_valid_key(&value) {
            return Some(value);
        }
    }

    toml_value.filter(|v| is_valid_key(v)).map(str::to_string)
}

/// Resolve the AcoustID API key
///
/// **Priority:** CLI → ENV → TOML. The key has no default, so a missing key
/// is a configuration error.
pub fn resolve_acoustid_api_key(cli_arg: Option<&str>, toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(ACOUSTID_API_KEY_ENV_VAR).ok();
    let toml_key = toml_config.acoustid_api_key.as_deref();

    let sources: Vec<&str> = [
        ("command line", cli_arg),
        ("environment", env_key.as_deref()),
        ("TOML", toml_key),
    ]
    .iter()
    .filter(|(_, key)| key.map(is_valid_key).unwrap_or(false))
    .map(|(name, _)| *name)
    .collect();

    if sources.len() > 1 {
        warn!(
            "AcoustID API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    resolve_setting(cli_arg, ACOUSTID_API_KEY_ENV_VAR, toml_key).ok_or_else(|| {
        Error::Config(format!(
            "AcoustID API key not configured. Please configure using one of:\n\
             1. Command line: --apikey your-key-here\n\
             2. Environment: {}=your-key-here\n\
             3. TOML config: acoustid_api_key = \"your-key\"\n\
             \n\
             Obtain API key at: https://acoustid.org/new-application",
            ACOUSTID_API_KEY_ENV_VAR
        ))
    })
}

/// Validate a key or setting value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub contact_email: Option<String>,
    pub fpcalc_path: PathBuf,
    pub max_workers: usize,
    pub musicbrainz_delay_ms: u64,
    pub log_level: String,
}

impl Settings {
    /// Merge TOML values over the compiled defaults
    ///
    /// Command-line overrides are applied by the caller afterwards.
    pub fn from_toml(toml_config: &TomlConfig) -> Self {
        let defaults = CompiledDefaults::default();

        let fpcalc_path = resolve_setting(
            None,
            FPCALC_ENV_VAR,
            toml_config
                .fpcalc_path
                .as_deref()
                .and_then(|p| p.to_str()),
        )
        .map(PathBuf::from)
        .unwrap_or(defaults.fpcalc_path);

        Self {
            app_name: toml_config.app_name.clone().unwrap_or(defaults.app_name),
            app_version: toml_config
                .app_version
                .clone()
                .unwrap_or(defaults.app_version),
            contact_email: resolve_setting(
                None,
                CONTACT_EMAIL_ENV_VAR,
                toml_config.contact_email.as_deref(),
            ),
            fpcalc_path,
            max_workers: toml_config
                .max_workers
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_workers),
            musicbrainz_delay_ms: toml_config
                .musicbrainz_delay_ms
                .unwrap_or(defaults.musicbrainz_delay_ms),
            log_level: toml_config.logging.level.clone(),
        }
    }
}
