use std::path::PathBuf;

/// Error types for loading translations and configuring the toolkit.
///
/// Missing keys and unknown locales are never errors: lookups degrade to
/// the fallback chain, then to the caller's default text, then to the key.
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    /// A translation or configuration file could not be read
    #[error("Failed to read file '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A file was read but is not valid JSON
    #[error("Failed to parse JSON from '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A translation document parsed but does not have the expected shape
    #[error("Invalid translation document: {0}")]
    InvalidDocument(String),
    /// A plural bundle has no `other` form (strict loading only)
    #[error("Plural bundle '{key}' in locale '{locale}' has no 'other' form")]
    MissingOtherForm { locale: String, key: String },
    /// A plural bundle member is not a CLDR category name (strict loading only)
    #[error("Unknown plural category '{category}' in '{key}' (locale '{locale}')")]
    UnknownPluralCategory {
        locale: String,
        key: String,
        category: String,
    },
    /// A locale code could not be understood by the CLDR plural data
    #[error("Invalid locale '{locale}': {reason}")]
    InvalidLocale { locale: String, reason: String },
    /// Configuration values are inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;
