//! Runtime configuration.
//!
//! Values are layered, later sources overriding earlier ones:
//! 1. built-in defaults,
//! 2. a TOML, YAML or JSON file (picked by extension),
//! 3. environment variables prefixed with `DLTRACK_`, e.g. `DLTRACK_NO_TRACK=true`.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use dltrack_tracker::{Encoding, Options};
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "DLTRACK_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Disable download tracking entirely.
    pub no_track: bool,
    /// How tracker documents are written.
    pub encoding: Encoding,
}

impl Config {
    /// Build the layered provider without extracting it.
    ///
    /// A config file that doesn't exist contributes nothing.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
            figment = match extension.to_lowercase().as_str() {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(extension.to_string())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load from `path`, or from [`default_path()`](Self::default_path)
    /// when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let default;
        let path = match path {
            Some(path) => Some(path),
            None => match Self::default_path() {
                Ok(path) => {
                    default = path;
                    Some(default.as_path())
                },
                Err(err) => {
                    tracing::debug!(error = ?err, "No default configuration file; using environment only");
                    None
                },
            },
        };
        let config: Self = Self::figment(path)?.extract().or_raise(|| ErrorKind::Load)?;
        tracing::debug!(no_track = config.no_track, encoding = %config.encoding, "Loaded configuration");
        Ok(config)
    }

    /// `<platform config dir>/dltrack/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "dltrack")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_raise(|| ErrorKind::NoConfigDirectory)
    }

    pub fn tracker_options(&self) -> Options {
        Options {
            disabled: self.no_track,
            encoding: self.encoding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_| {
            let config = Config::load(Some(Path::new("missing.toml"))).unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.tracker_options(), Options::default());
            Ok(())
        });
    }

    #[rstest]
    #[case("dltrack.toml", "no_track = true\nencoding = \"pretty\"\n")]
    #[case("dltrack.yaml", "no_track: true\nencoding: pretty\n")]
    #[case("dltrack.yml", "no_track: true\nencoding: pretty\n")]
    #[case("dltrack.json", r#"{"no_track": true, "encoding": "pretty"}"#)]
    fn test_file_formats(#[case] filename: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(filename, contents)?;
            let config = Config::load(Some(Path::new(filename))).unwrap();
            assert!(config.no_track);
            assert_eq!(config.encoding, Encoding::Pretty);
            let options = config.tracker_options();
            assert!(options.disabled);
            assert_eq!(options.encoding, Encoding::Pretty);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("dltrack.toml", "encoding = \"pretty\"")?;
            jail.set_env("DLTRACK_NO_TRACK", "true");
            jail.set_env("DLTRACK_ENCODING", "compact");
            let config = Config::load(Some(Path::new("dltrack.toml"))).unwrap();
            assert!(config.no_track);
            assert_eq!(config.encoding, Encoding::Compact);
            Ok(())
        });
    }

    #[rstest]
    #[case("compact", Encoding::Compact)]
    #[case("json", Encoding::Compact)]
    #[case("pretty", Encoding::Pretty)]
    fn test_encoding_names_match_parsing(#[case] name: &str, #[case] expected: Encoding) {
        Jail::expect_with(|jail| {
            jail.create_file("dltrack.toml", &format!("encoding = \"{name}\""))?;
            let config = Config::load(Some(Path::new("dltrack.toml"))).unwrap();
            assert_eq!(config.encoding, expected);
            assert_eq!(name.parse::<Encoding>().unwrap(), expected);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value() {
        Jail::expect_with(|jail| {
            jail.create_file("dltrack.toml", "encoding = \"bson\"")?;
            let err = Config::load(Some(Path::new("dltrack.toml"))).unwrap_err();
            assert_eq!(*err, ErrorKind::Load);
            Ok(())
        });
    }

    #[rstest]
    #[case("dltrack.ini", "ini")]
    #[case("dltrack", "")]
    fn test_unsupported_format(#[case] filename: &str, #[case] extension: &str) {
        let err = Config::figment(Some(Path::new(filename))).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedFormat(extension.to_string()));
    }
}
