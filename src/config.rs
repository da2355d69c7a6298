//! Configuration for the [`I18n`](crate::I18n) facade.
//!
//! A configuration file is plain JSON; every field is optional:
//!
//! ```json
//! {
//!     "default_locale": "en-US",
//!     "fallbacks": { "de-AT": ["de-DE"] },
//!     "verbosity": "normal",
//!     "strict_plurals": false,
//!     "translations_dir": "locales"
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{I18nError, Result};

/// Verbosity level for debug logging during fallback resolution
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VerbosityLevel {
    /// No debug logging
    Silent = 0,
    /// Log only when fallbacks are used (default)
    #[default]
    Normal = 1,
    /// Log detailed information about fallback resolution
    Verbose = 2,
}

pub const DEFAULT_LOCALE: &str = "en-US";

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct I18nConfig {
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Extra fallback entries, merged over the built-in table
    #[serde(default)]
    pub fallbacks: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub verbosity: VerbosityLevel,
    #[serde(default)]
    pub strict_plurals: bool,
    /// Directory of `<locale>.json` files loaded at build time
    #[serde(default)]
    pub translations_dir: Option<PathBuf>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        I18nConfig {
            default_locale: default_locale(),
            fallbacks: BTreeMap::new(),
            verbosity: VerbosityLevel::default(),
            strict_plurals: false,
            translations_dir: None,
        }
    }
}

impl I18nConfig {
    /// Read a JSON configuration file.
    ///
    /// A relative `translations_dir` is resolved against the directory the
    /// configuration file lives in.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| I18nError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: I18nConfig =
            serde_json::from_str(&content).map_err(|source| I18nError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let (Some(dir), Some(base)) = (&config.translations_dir, path.parent()) {
            if dir.is_relative() {
                config.translations_dir = Some(base.join(dir));
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_locale.trim().is_empty() {
            return Err(I18nError::Config("default_locale must not be empty".to_string()));
        }
        if let Some((locale, _)) = self.fallbacks.iter().find(|(locale, _)| locale.is_empty()) {
            return Err(I18nError::Config(format!(
                "fallback entry with empty locale '{}'",
                locale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = I18nConfig::default();
        assert_eq!(config.default_locale, "en-US");
        assert_eq!(config.verbosity, VerbosityLevel::Normal);
        assert!(!config.strict_plurals);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: I18nConfig =
            serde_json::from_str(r#"{"fallbacks": {"de-AT": ["de-DE"]}, "verbosity": "silent"}"#)
                .unwrap();
        assert_eq!(config.default_locale, "en-US");
        assert_eq!(config.verbosity, VerbosityLevel::Silent);
        assert_eq!(config.fallbacks["de-AT"], vec!["de-DE".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<I18nConfig, _> =
            serde_json::from_str(r#"{"default_locale": "en-US", "colour": "blue"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_resolves_translations_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("i18n.json");
        fs::write(
            &path,
            r#"{"default_locale": "de-DE", "translations_dir": "locales", "strict_plurals": true}"#,
        )
        .unwrap();

        let config = I18nConfig::from_file(&path).unwrap();
        assert_eq!(config.default_locale, "de-DE");
        assert!(config.strict_plurals);
        assert_eq!(config.translations_dir, Some(dir.path().join("locales")));
    }

    #[test]
    fn test_from_file_rejects_empty_locale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("i18n.json");
        fs::write(&path, r#"{"default_locale": " "}"#).unwrap();
        assert!(matches!(
            I18nConfig::from_file(&path),
            Err(I18nError::Config(_))
        ));
    }

    #[test]
    fn test_verbosity_ordering() {
        assert!(VerbosityLevel::Verbose > VerbosityLevel::Normal);
        assert!(VerbosityLevel::Normal > VerbosityLevel::Silent);
    }
}
