//! Configuration loading and management.

use std::path::{Path, PathBuf};

use awt_core::AccumulatorOptions;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Validation and field-name options for every accumulator.
    #[serde(default)]
    pub accumulator: AccumulatorOptions,

    /// Sort records by timestamp before accumulating.
    #[serde(default)]
    pub sort_events: bool,
}

impl Config {
    /// Loads configuration from the default location, an optional file, and
    /// `AWT_` environment variables, later sources winning.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (AWT_*), nested keys split on `__`
        figment = figment.merge(Env::prefixed("AWT_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for awt.
///
/// On Linux: `~/.config/awt`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("awt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::Jail;

    #[test]
    fn test_dirs_config_path_ends_with_awt() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "awt");
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "awt.toml",
                r#"
                sort_events = true

                [accumulator]
                check_device_id = false
                time_field_name = "ts"
                "#,
            )?;

            let config = Config::load_from(Some(Path::new("awt.toml")))?;
            assert!(config.sort_events);
            assert!(!config.accumulator.check_device_id);
            assert!(config.accumulator.throws);
            assert_eq!(config.accumulator.time_field_name, "ts");
            assert_eq!(config.accumulator.status_id_field_name, "statusId");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("awt.toml", "[accumulator]\nthrows = true\n")?;
            jail.set_env("AWT_ACCUMULATOR__THROWS", "false");
            jail.set_env("AWT_ACCUMULATOR__DEVICE_ID_FIELD_NAME", "phone");

            let config = Config::load_from(Some(Path::new("awt.toml")))?;
            assert!(!config.accumulator.throws);
            assert_eq!(config.accumulator.device_id_field_name, "phone");
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load_from(Some(Path::new("absent.toml")))?;
            assert!(config.accumulator.throws);
            assert!(!config.sort_events);
            Ok(())
        });
    }
}
