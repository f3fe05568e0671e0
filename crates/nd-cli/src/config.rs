//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use nd_core::TrackingPurpose;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Purpose used by `nd add` when `--purpose` is not given.
    #[serde(default)]
    pub default_purpose: TrackingPurpose,

    /// Rolling window length for `nd peak` when neither the flag nor the
    /// country's purpose sets one.
    #[serde(default = "default_rolling_window_days")]
    pub rolling_window_days: u32,
}

const fn default_rolling_window_days() -> u32 {
    180
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("default_purpose", &self.default_purpose)
            .field("rolling_window_days", &self.rolling_window_days)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("nd.db"),
            default_purpose: TrackingPurpose::default(),
            rolling_window_days: default_rolling_window_days(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, the user config file, `config_path`,
    /// then `ND_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("ND_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for nd.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("nd"))
}

/// Returns the platform-specific data directory for nd.
///
/// On Linux: `~/.local/share/nd`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("nd"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_dirs_data_path_ends_with_nd() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "nd");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("nd.db"));
        assert_eq!(config.default_purpose, TrackingPurpose::Tourist);
        assert_eq!(config.rolling_window_days, 180);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"database_path = "/tmp/custom.db"
default_purpose = "tax-residence""#
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.default_purpose, TrackingPurpose::TaxResidence);
        assert_eq!(config.rolling_window_days, 180);
    }

    #[test]
    fn test_invalid_purpose_in_config_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"default_purpose = "holiday""#).unwrap();
        file.flush().unwrap();

        assert!(Config::load_from(Some(file.path())).is_err());
    }
}
