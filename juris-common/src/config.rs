//! Configuration loading and database path resolution
//!
//! Resolution priority (highest first):
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default
//!
//! A missing config file is never fatal: a warning is logged and compiled
//! defaults are used. A config file that exists but fails to parse or
//! validate is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "JURIS_CONFIG";

/// Environment variable naming the SQLite database file
pub const DATABASE_ENV_VAR: &str = "JURIS_DATABASE";

/// Phase structure and windowing constants
///
/// Values differ between deployment contexts, so every one of them is
/// configuration rather than a hard-coded constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseSettings {
    /// Articles per regular phase (chunk size)
    pub articles_per_phase: usize,
    /// Regular phases of one law between two review phases
    pub review_phase_interval: usize,
    /// Regular phases a law contributes to one interleaving module
    pub phases_per_module_per_law: usize,
    /// Phases per journey page
    pub phases_per_journey: usize,
    /// Phases shown past the current one in the initial scroll window
    pub scroll_lookahead: usize,
    /// Default batch size for "load more"
    pub load_more_batch_size: usize,
}

impl Default for PhaseSettings {
    fn default() -> Self {
        Self {
            articles_per_phase: 6,
            review_phase_interval: 2,
            phases_per_module_per_law: 6,
            phases_per_journey: 10,
            scroll_lookahead: 5,
            load_more_batch_size: 20,
        }
    }
}

impl PhaseSettings {
    /// Reject values that would make the builder or pager degenerate
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("articles_per_phase", self.articles_per_phase),
            ("review_phase_interval", self.review_phase_interval),
            ("phases_per_module_per_law", self.phases_per_module_per_law),
            ("phases_per_journey", self.phases_per_journey),
            ("load_more_batch_size", self.load_more_batch_size),
        ];

        for (name, value) in checks {
            if value == 0 {
                return Err(Error::Config(format!("phases.{} must be at least 1", name)));
            }
        }

        Ok(())
    }
}

/// Advisory cache lifetimes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Lifetime of cached phase structures (seconds)
    pub structure_ttl_secs: u64,
    /// Lifetime of cached progress evaluations (seconds)
    pub evaluation_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            structure_ttl_secs: 600,
            evaluation_ttl_secs: 120,
        }
    }
}

/// Lives/XP economy knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    /// XP awarded per correct answer
    pub xp_per_correct_answer: i64,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            xp_per_correct_answer: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5740".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete TOML configuration file
///
/// Every section is optional; absent keys take their compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub phases: PhaseSettings,
    pub cache: CacheSettings,
    pub economy: EconomySettings,
}

impl TomlConfig {
    /// Parse and validate configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.phases.validate()?;
        Ok(config)
    }

    /// Load configuration from a file that is known to exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Locate the config file: CLI argument, then `JURIS_CONFIG`, then the
/// platform config directory (`<config_dir>/juris/config.toml`)
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // Priority 3: Platform config directory
    dirs::config_dir().map(|d| d.join("juris").join("config.toml"))
}

/// Load configuration, falling back to defaults when no file exists
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            TomlConfig::load(&path)
        }
        Some(path) => {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            warn!("No config directory on this platform, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Resolve the database file path
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.database.path {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_database_path()
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("juris"))
        .unwrap_or_else(|| PathBuf::from("./juris_data"))
        .join("juris.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PhaseSettings::default().validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let settings = PhaseSettings {
            articles_per_phase: 0,
            ..PhaseSettings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_lookahead_allowed() {
        let settings = PhaseSettings {
            scroll_lookahead: 0,
            ..PhaseSettings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TomlConfig::parse(
            r#"
            [phases]
            articles_per_phase = 7
            review_phase_interval = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.phases.articles_per_phase, 7);
        assert_eq!(config.phases.review_phase_interval, 3);
        assert_eq!(config.phases.phases_per_module_per_law, 6);
        assert_eq!(config.cache, CacheSettings::default());
        assert_eq!(config.server.bind_addr, "127.0.0.1:5740");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TomlConfig::parse("[phases\narticles_per_phase = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_toml_with_invalid_phase_settings_rejected() {
        let result = TomlConfig::parse("[phases]\nreview_phase_interval = 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_database_path_wins() {
        let config = TomlConfig {
            database: DatabaseConfig {
                path: Some(PathBuf::from("/srv/toml.db")),
            },
            ..TomlConfig::default()
        };
        let resolved = resolve_database_path(Some(Path::new("/tmp/cli.db")), &config);
        assert_eq!(resolved, PathBuf::from("/tmp/cli.db"));
    }
}
