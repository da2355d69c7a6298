//! Translation storage: registered locales and per-locale translation maps.
//!
//! # Loading
//!
//! Translation documents are nested JSON objects. Nested keys are flattened
//! into dotted paths:
//!
//! ```json
//! {
//!     "nav": { "home": "Home", "about": "About" },
//!     "items": { "one": "{{count}} item", "other": "{{count}} items" }
//! }
//! ```
//!
//! yields `nav.home`, `nav.about` and the plural translation `items`.
//!
//! An object with a `"one"` or `"other"` member is always treated as a
//! plural bundle. A genuine group of keys named `one`/`other` is therefore
//! indistinguishable from plurals and will be loaded as one.
//!
//! # Concurrency
//!
//! Both maps sit behind one `RwLock`. Writers (`add_locale`,
//! `add_translation`, the loaders) take it exclusively; readers take the
//! shared side and see either the whole old or the whole new entry.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{I18nError, Result};
use crate::locale::{Locale, default_locales};
use crate::plural::PluralForm;
use crate::translation::Translation;

#[derive(Debug, Default)]
struct StoreData {
    locales: HashMap<String, Locale>,
    // Keyed by locale and then by translation key
    // e.g. translations["en-US"]["nav.home"] = "Home"
    //      translations["de-DE"]["nav.home"] = "Startseite"
    translations: HashMap<String, HashMap<String, Arc<Translation>>>,
}

#[derive(Debug, Default)]
pub struct TranslationStore {
    data: RwLock<StoreData>,
    strict_plurals: bool,
}

impl TranslationStore {
    /// Create an empty store with no locales.
    pub fn new() -> Self {
        TranslationStore::default()
    }

    /// Create a store pre-populated with the built-in locales
    /// (en-US, en-GB, es-ES, fr-FR, de-DE, ja-JP, ar-SA).
    pub fn with_default_locales() -> Self {
        let store = TranslationStore::new();
        for locale in default_locales() {
            store.add_locale(locale);
        }
        store
    }

    /// Reject plural bundles without an `other` form or with unknown
    /// category names instead of loading them with a warning.
    pub fn with_strict_plurals(mut self, strict: bool) -> Self {
        self.strict_plurals = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict_plurals
    }

    pub fn add_locale(&self, locale: Locale) {
        let mut data = self.data.write();
        data.translations.entry(locale.code.clone()).or_default();
        debug!("Registered locale '{}'", locale.code);
        data.locales.insert(locale.code.clone(), locale);
    }

    pub fn get_locale(&self, code: &str) -> Option<Locale> {
        self.data.read().locales.get(code).cloned()
    }

    /// Plural category for `count` from the locale's own rule, if the locale
    /// is registered and has one.
    pub fn plural_form(&self, code: &str, count: i64) -> Option<PluralForm> {
        // Classify outside the lock: a rule is caller code and may use the store
        let rule = self
            .data
            .read()
            .locales
            .get(code)
            .and_then(|locale| locale.plural_rule.clone())?;
        Some(rule.classify(count))
    }

    /// Codes of all registered locales, sorted.
    pub fn locale_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.data.read().locales.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Insert or replace the translation for `(translation.locale, translation.key)`.
    ///
    /// The locale does not have to be registered.
    pub fn add_translation(&self, translation: Translation) {
        let mut data = self.data.write();
        Self::insert(&mut data, translation);
    }

    fn insert(data: &mut StoreData, translation: Translation) {
        data.translations
            .entry(translation.locale.clone())
            .or_default()
            .insert(translation.key.clone(), Arc::new(translation));
    }

    pub fn get_translation(&self, locale: &str, key: &str) -> Option<Arc<Translation>> {
        self.data
            .read()
            .translations
            .get(locale)
            .and_then(|messages| messages.get(key))
            .cloned()
    }

    pub fn translation_count(&self, locale: &str) -> usize {
        self.data
            .read()
            .translations
            .get(locale)
            .map_or(0, HashMap::len)
    }

    /// Flatten a nested JSON object into dotted keys and store the leaves
    /// under `locale`.
    ///
    /// Returns the number of translations added; a plural bundle counts once.
    /// The whole document is flattened before anything is stored, so a
    /// failing document leaves the store untouched.
    ///
    /// # Errors
    /// - [`I18nError::InvalidDocument`] if `data` is not an object
    /// - [`I18nError::MissingOtherForm`] / [`I18nError::UnknownPluralCategory`]
    ///   for malformed plural bundles when the store is strict
    pub fn load_json(&self, locale: &str, data: &Value, prefix: &str) -> Result<usize> {
        let object = data.as_object().ok_or_else(|| {
            I18nError::InvalidDocument(format!(
                "root of translations for '{}' must be an object",
                locale
            ))
        })?;

        let mut flattened = Vec::new();
        self.flatten(locale, object, prefix, &mut flattened)?;

        let count = flattened.len();
        let mut store = self.data.write();
        for translation in flattened {
            Self::insert(&mut store, translation);
        }
        Ok(count)
    }

    fn flatten(
        &self,
        locale: &str,
        object: &Map<String, Value>,
        prefix: &str,
        out: &mut Vec<Translation>,
    ) -> Result<()> {
        for (key, value) in object {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };

            match value {
                Value::Object(members) if is_plural_bundle(members) => {
                    let forms = self.plural_forms(locale, &full_key, members)?;
                    out.push(Translation::plural(locale, &full_key, forms));
                }
                Value::Object(members) => self.flatten(locale, members, &full_key, out)?,
                Value::Null | Value::Array(_) => {
                    warn!(
                        "Translation '{}' in locale '{}' is not a string, number or boolean, skipping",
                        full_key, locale
                    );
                }
                scalar => {
                    if let Some(text) = scalar_text(scalar) {
                        out.push(Translation::new(locale, &full_key, &text));
                    }
                }
            }
        }
        Ok(())
    }

    fn plural_forms(
        &self,
        locale: &str,
        key: &str,
        members: &Map<String, Value>,
    ) -> Result<BTreeMap<PluralForm, String>> {
        let mut forms = BTreeMap::new();
        for (name, value) in members {
            let form = match name.parse::<PluralForm>() {
                Ok(form) => form,
                Err(_) if self.strict_plurals => {
                    return Err(I18nError::UnknownPluralCategory {
                        locale: locale.to_string(),
                        key: key.to_string(),
                        category: name.clone(),
                    });
                }
                Err(_) => {
                    warn!(
                        "Ignoring unknown plural category '{}' in '{}' (locale '{}')",
                        name, key, locale
                    );
                    continue;
                }
            };
            match scalar_text(value) {
                Some(text) => {
                    forms.insert(form, text);
                }
                None => warn!(
                    "Plural form '{}' of '{}' (locale '{}') is not a string, skipping",
                    name, key, locale
                ),
            }
        }

        if !forms.contains_key(&PluralForm::Other) {
            if self.strict_plurals {
                return Err(I18nError::MissingOtherForm {
                    locale: locale.to_string(),
                    key: key.to_string(),
                });
            }
            warn!(
                "Plural bundle '{}' in locale '{}' has no 'other' form",
                key, locale
            );
        }
        Ok(forms)
    }

    /// Read a JSON translation file and load it under `locale`.
    ///
    /// # Errors
    /// - [`I18nError::FileAccess`] if the file cannot be read
    /// - [`I18nError::Parse`] if it is not valid JSON
    /// - anything [`load_json`](Self::load_json) rejects
    pub fn load_file(&self, locale: &str, path: &Path) -> Result<usize> {
        let content = fs::read_to_string(path).map_err(|source| I18nError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let json: Value = serde_json::from_str(&content).map_err(|source| I18nError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let count = self.load_json(locale, &json, "")?;
        info!(
            "Loaded {} translations for '{}' from {}",
            count,
            locale,
            path.display()
        );
        Ok(count)
    }

    /// Load every `*.json` file in `dir`, using the file stem as the locale
    /// code (`en-US.json` → `en-US`).
    ///
    /// Returns the total number of translations loaded.
    pub fn load_dir(&self, dir: &Path) -> Result<usize> {
        let entries = fs::read_dir(dir).map_err(|source| I18nError::FileAccess {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| I18nError::FileAccess {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            warn!("No JSON files found in directory {}", dir.display());
        }

        let mut total = 0;
        for path in paths {
            let locale = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(|| {
                    I18nError::InvalidDocument(format!("Invalid filename: {}", path.display()))
                })?
                .to_string();
            total += self.load_file(&locale, &path)?;
        }
        Ok(total)
    }
}

fn is_plural_bundle(members: &Map<String, Value>) -> bool {
    members.contains_key("one") || members.contains_key("other")
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
