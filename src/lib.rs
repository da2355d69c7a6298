//! Internationalization toolkit: translation catalogs with locale fallback,
//! plural forms and `{{name}}` interpolation, plus locale-aware formatting of
//! numbers, currency, percentages, dates and times.
//!
//! ```
//! use roadlocalize::{FormatType, I18n, TranslateArgs};
//! use serde_json::json;
//!
//! let i18n = I18n::new("en-US");
//! i18n.load_translations("en-US", &json!({
//!     "greeting": "Hello, {{name}}!",
//!     "items": { "one": "{{count}} item", "other": "{{count}} items" }
//! })).unwrap();
//! i18n.load_translations("es-ES", &json!({ "greeting": "¡Hola, {{name}}!" })).unwrap();
//!
//! assert_eq!(i18n.t("greeting", &TranslateArgs::new().param("name", "Alice")), "Hello, Alice!");
//! assert_eq!(i18n.t("items", &TranslateArgs::new().count(5)), "5 items");
//!
//! i18n.set_locale("es-ES");
//! assert_eq!(i18n.t("greeting", &TranslateArgs::new().param("name", "Alice")), "¡Hola, Alice!");
//! assert_eq!(i18n.format(1234567.89, FormatType::Number), "1.234.567,89");
//! assert_eq!(i18n.format(99.99, FormatType::Currency), "99,99 €");
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Timelike;
use serde_json::Value;

pub mod config;
pub mod error;
pub mod formatter;
pub mod locale;
pub mod manager;
pub mod plural;
pub mod store;
pub mod translation;
pub mod translator;

#[cfg(test)]
mod integration_tests;

// Re-export main types for convenient access
pub use config::{DEFAULT_LOCALE, I18nConfig, VerbosityLevel};
pub use error::{I18nError, Result};
pub use formatter::{FormatType, FormatValue, Formatter, Number};
pub use locale::{CurrencyPosition, Locale, LocaleInfo, TextDirection, default_locales};
pub use manager::{LocaleGuard, LocaleManager};
pub use plural::{CldrPluralRule, DefaultPluralRule, PluralForm, PluralRule};
pub use store::TranslationStore;
pub use translation::Translation;
pub use translator::{Params, TranslateArgs, Translator, default_fallbacks, interpolate};

/// Builder for [`I18n`].
#[derive(Debug, Clone)]
pub struct I18nBuilder {
    default_locale: String,
    fallbacks: Vec<(String, Vec<String>)>,
    locales: Vec<Locale>,
    verbosity: VerbosityLevel,
    strict_plurals: bool,
    translations_dir: Option<PathBuf>,
}

impl Default for I18nBuilder {
    fn default() -> Self {
        I18nBuilder::new()
    }
}

impl I18nBuilder {
    pub fn new() -> Self {
        I18nBuilder {
            default_locale: DEFAULT_LOCALE.to_string(),
            fallbacks: Vec::new(),
            locales: Vec::new(),
            verbosity: VerbosityLevel::Normal,
            strict_plurals: false,
            translations_dir: None,
        }
    }

    pub fn from_config(config: &I18nConfig) -> Self {
        let mut builder = I18nBuilder::new()
            .default_locale(&config.default_locale)
            .verbosity(config.verbosity)
            .strict_plurals(config.strict_plurals);
        builder.fallbacks = config
            .fallbacks
            .iter()
            .map(|(locale, chain)| (locale.clone(), chain.clone()))
            .collect();
        builder.translations_dir = config.translations_dir.clone();
        builder
    }

    pub fn default_locale(mut self, locale: &str) -> Self {
        self.default_locale = locale.to_string();
        self
    }

    /// Add or replace a fallback chain entry.
    pub fn fallback(mut self, locale: &str, chain: &[&str]) -> Self {
        self.fallbacks.push((
            locale.to_string(),
            chain.iter().map(|l| l.to_string()).collect(),
        ));
        self
    }

    /// Register a locale in addition to the built-in ones.
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locales.push(locale);
        self
    }

    pub fn verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn strict_plurals(mut self, strict: bool) -> Self {
        self.strict_plurals = strict;
        self
    }

    /// Load every `<locale>.json` file in `dir` when building.
    pub fn translations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.translations_dir = Some(dir.into());
        self
    }

    /// # Errors
    /// Fails only when a translations directory was given and cannot be
    /// loaded.
    pub fn build(mut self) -> Result<I18n> {
        let dir = self.translations_dir.take();
        let i18n = self.assemble();
        if let Some(dir) = dir {
            i18n.load_dir(&dir)?;
        }
        Ok(i18n)
    }

    fn assemble(self) -> I18n {
        let store =
            TranslationStore::with_default_locales().with_strict_plurals(self.strict_plurals);
        for locale in self.locales {
            store.add_locale(locale);
        }
        let store = Arc::new(store);

        let mut translator = Translator::new(Arc::clone(&store), &self.default_locale)
            .with_verbosity(self.verbosity);
        for (locale, chain) in self.fallbacks {
            translator.set_fallback(&locale, chain);
        }
        let translator = Arc::new(translator);
        let locale_manager = LocaleManager::new(Arc::clone(&translator));

        I18n {
            store,
            translator,
            locale_manager,
        }
    }
}

/// Facade over a [`TranslationStore`], a [`Translator`] and a
/// [`LocaleManager`]. Each instance is configured independently.
#[derive(Debug)]
pub struct I18n {
    store: Arc<TranslationStore>,
    translator: Arc<Translator>,
    locale_manager: LocaleManager,
}

impl Default for I18n {
    fn default() -> Self {
        I18n::new(DEFAULT_LOCALE)
    }
}

impl I18n {
    /// Create an instance with the built-in locales and fallback table.
    pub fn new(default_locale: &str) -> Self {
        I18nBuilder::new().default_locale(default_locale).assemble()
    }

    pub fn builder() -> I18nBuilder {
        I18nBuilder::new()
    }

    pub fn store(&self) -> &Arc<TranslationStore> {
        &self.store
    }

    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    pub fn locale_manager(&self) -> &LocaleManager {
        &self.locale_manager
    }

    /// Load a nested translation document for `locale`.
    pub fn load_translations(&self, locale: &str, data: &Value) -> Result<usize> {
        self.store.load_json(locale, data, "")
    }

    pub fn load_file(&self, locale: &str, path: impl AsRef<Path>) -> Result<usize> {
        self.store.load_file(locale, path.as_ref())
    }

    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Result<usize> {
        self.store.load_dir(dir.as_ref())
    }

    pub fn add_locale(&self, locale: Locale) {
        self.store.add_locale(locale);
    }

    /// Translate `key` in the current locale (or `args.locale` if set).
    pub fn t(&self, key: &str, args: &TranslateArgs) -> String {
        self.locale_manager.t(key, args)
    }

    pub fn has_translation(&self, key: &str, locale: Option<&str>) -> bool {
        self.translator.has_translation(key, locale)
    }

    /// Set the current thread's locale for this instance.
    pub fn set_locale(&self, locale: &str) {
        self.locale_manager.set_current(locale);
    }

    pub fn get_locale(&self) -> String {
        self.locale_manager.current()
    }

    /// Format a value in the current locale; see [`FormatType`] for how the
    /// type and the value's kind interact.
    pub fn format(&self, value: impl Into<FormatValue>, format_type: FormatType) -> String {
        self.locale_manager
            .get_formatter(None)
            .format(&value.into(), format_type)
    }

    pub fn format_time<T: Timelike>(&self, value: &T) -> String {
        self.locale_manager.format_time(value)
    }

    /// Codes of all registered locales, sorted.
    pub fn available_locales(&self) -> Vec<String> {
        self.store.locale_codes()
    }
}
