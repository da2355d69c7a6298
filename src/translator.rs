//! Key resolution: fallback chain, plural selection and interpolation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use roadlocalize::{TranslateArgs, TranslationStore, Translator};
//! use serde_json::json;
//!
//! let store = Arc::new(TranslationStore::with_default_locales());
//! store
//!     .load_json("en-US", &json!({
//!         "welcome": "Welcome, {{name}}!",
//!         "items": { "one": "{{count}} item", "other": "{{count}} items" }
//!     }), "")
//!     .unwrap();
//!
//! let translator = Translator::new(store, "en-US");
//! let args = TranslateArgs::new().locale("en-GB").param("name", "Ada");
//! assert_eq!(translator.translate("welcome", &args), "Welcome, Ada!");
//! assert_eq!(translator.translate("items", &TranslateArgs::new().count(5)), "5 items");
//! assert_eq!(translator.translate("missing.key", &TranslateArgs::new()), "missing.key");
//! ```

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::config::VerbosityLevel;
use crate::plural::{DefaultPluralRule, PluralForm, PluralRule};
use crate::store::TranslationStore;
use crate::translation::Translation;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

/// Named parameters substituted into `{{name}}` placeholders
pub type Params = HashMap<String, String>;

/// Optional inputs to [`Translator::translate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateArgs {
    /// Locale to resolve in; the translator's default when absent
    pub locale: Option<String>,
    pub params: Params,
    /// Selects a plural form and is exposed as `{{count}}`
    pub count: Option<i64>,
    /// Returned instead of the key when nothing matches
    pub default: Option<String>,
}

impl TranslateArgs {
    pub fn new() -> Self {
        TranslateArgs::default()
    }

    pub fn locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.to_string());
        self
    }

    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn default_text(mut self, text: &str) -> Self {
        self.default = Some(text.to_string());
        self
    }
}

/// Built-in fallback table: regional variants fall back to the closest
/// locale with full data before the default locale.
pub fn default_fallbacks() -> HashMap<String, Vec<String>> {
    [
        ("en-GB", "en-US"),
        ("es-MX", "es-ES"),
        ("fr-CA", "fr-FR"),
        ("pt-BR", "pt-PT"),
        ("zh-TW", "zh-CN"),
    ]
    .into_iter()
    .map(|(locale, fallback)| (locale.to_string(), vec![fallback.to_string()]))
    .collect()
}

/// Replace every `{{name}}` with `params[name]` in a single pass.
///
/// Unknown names are left untouched and substituted values are not scanned
/// again, so a value containing `{{` is inserted verbatim.
pub fn interpolate(text: &str, params: &Params) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[derive(Debug)]
pub struct Translator {
    store: Arc<TranslationStore>,
    default_locale: String,
    fallback_chain: HashMap<String, Vec<String>>,
    verbosity: VerbosityLevel,
}

impl Translator {
    pub fn new(store: Arc<TranslationStore>, default_locale: &str) -> Self {
        Translator {
            store,
            default_locale: default_locale.to_string(),
            fallback_chain: default_fallbacks(),
            verbosity: VerbosityLevel::Normal,
        }
    }

    /// Set (or replace) the fallback locales tried after `locale`.
    pub fn with_fallback(mut self, locale: &str, chain: &[&str]) -> Self {
        self.set_fallback(locale, chain.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn set_fallback(&mut self, locale: &str, chain: Vec<String>) {
        self.fallback_chain.insert(locale.to_string(), chain);
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn get_verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn store(&self) -> &Arc<TranslationStore> {
        &self.store
    }

    pub fn fallback_chain(&self, locale: &str) -> &[String] {
        self.fallback_chain
            .get(locale)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Locales consulted for `locale`, in order: the locale itself, its
    /// fallback chain, then the default locale. Duplicates are kept.
    pub fn candidate_locales<'a>(&'a self, locale: &'a str) -> Vec<&'a str> {
        let mut candidates = vec![locale];
        candidates.extend(self.fallback_chain(locale).iter().map(String::as_str));
        candidates.push(&self.default_locale);
        candidates
    }

    /// Resolve `key` to display text. Never fails: when no candidate locale
    /// has the key, the caller's default text or the key itself is returned.
    pub fn translate(&self, key: &str, args: &TranslateArgs) -> String {
        let locale = args.locale.as_deref().unwrap_or(&self.default_locale);
        let candidates = self.candidate_locales(locale);

        for candidate in &candidates {
            if let Some(translation) = self.store.get_translation(candidate, key) {
                if *candidate != locale && self.verbosity >= VerbosityLevel::Normal {
                    debug!(
                        "Fallback: Using message '{}' from locale '{}' (requested: '{}')",
                        key, candidate, locale
                    );
                }
                if self.verbosity >= VerbosityLevel::Verbose {
                    trace!("Fallback chain: {}", candidates.join(" -> "));
                }
                return self.render(&translation, candidate, args);
            }
        }

        if self.verbosity >= VerbosityLevel::Verbose {
            debug!(
                "No message found for '{}' in locale '{}' or its fallbacks: {}",
                key,
                locale,
                candidates.join(" -> ")
            );
        }
        args.default.clone().unwrap_or_else(|| key.to_string())
    }

    /// Shorthand for [`translate`](Self::translate)
    pub fn t(&self, key: &str, args: &TranslateArgs) -> String {
        self.translate(key, args)
    }

    /// Whether `locale` itself (not its fallbacks) has `key`.
    pub fn has_translation(&self, key: &str, locale: Option<&str>) -> bool {
        let locale = locale.unwrap_or(&self.default_locale);
        self.store.get_translation(locale, key).is_some()
    }

    /// Plural category for `count` in `locale`: the locale's own rule when it
    /// has one, otherwise [`DefaultPluralRule`].
    pub fn plural_form(&self, locale: &str, count: i64) -> PluralForm {
        self.store
            .plural_form(locale, count)
            .unwrap_or_else(|| DefaultPluralRule.classify(count))
    }

    fn render(&self, translation: &Translation, locale: &str, args: &TranslateArgs) -> String {
        match args.count {
            Some(count) if translation.is_plural() => {
                let form = self.plural_form(locale, count);
                let mut params = args.params.clone();
                params.insert("count".to_string(), count.to_string());
                interpolate(translation.text_for(form), &params)
            }
            _ => interpolate(&translation.value, &args.params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::plural::CldrPluralRule;
    use serde_json::json;

    fn translator() -> Translator {
        let store = Arc::new(TranslationStore::with_default_locales());
        store
            .load_json(
                "en-US",
                &json!({
                    "welcome": "Welcome to RoadLocalize",
                    "greeting": "Hello, {{name}}!",
                    "items": {"one": "{{count}} item", "other": "{{count}} items"},
                    "nav": {"home": "Home"}
                }),
                "",
            )
            .unwrap();
        store
            .load_json(
                "es-ES",
                &json!({
                    "greeting": "¡Hola, {{name}}!",
                    "items": {"one": "{{count}} artículo", "other": "{{count}} artículos"}
                }),
                "",
            )
            .unwrap();
        Translator::new(store, "en-US").with_verbosity(VerbosityLevel::Silent)
    }

    #[test]
    fn test_plain_lookup() {
        let t = translator();
        assert_eq!(t.translate("welcome", &TranslateArgs::new()), "Welcome to RoadLocalize");
        assert_eq!(t.translate("nav.home", &TranslateArgs::new()), "Home");
    }

    #[test]
    fn test_missing_key_returns_key() {
        let t = translator();
        assert_eq!(t.translate("missing.key", &TranslateArgs::new()), "missing.key");
    }

    #[test]
    fn test_missing_key_returns_default() {
        let t = translator();
        let args = TranslateArgs::new().default_text("Fallback text");
        assert_eq!(t.translate("missing.key", &args), "Fallback text");
        // The default is not used when the key exists
        assert_eq!(t.translate("nav.home", &args), "Home");
    }

    #[test]
    fn test_fallback_chain_en_gb() {
        let t = translator();
        let args = TranslateArgs::new().locale("en-GB");
        assert_eq!(t.translate("welcome", &args), "Welcome to RoadLocalize");
        assert_eq!(t.candidate_locales("en-GB"), vec!["en-GB", "en-US", "en-US"]);
    }

    #[test]
    fn test_fallback_chain_es_mx() {
        let t = translator();
        let args = TranslateArgs::new().locale("es-MX").param("name", "Ana");
        assert_eq!(t.translate("greeting", &args), "¡Hola, Ana!");
        // Keys missing in es-ES still reach the default locale
        assert_eq!(t.translate("nav.home", &args), "Home");
    }

    #[test]
    fn test_custom_fallback() {
        let t = translator().with_fallback("es-AR", &["es-ES"]);
        let args = TranslateArgs::new().locale("es-AR").count(2);
        assert_eq!(t.translate("items", &args), "2 artículos");
        assert_eq!(t.fallback_chain("es-AR"), ["es-ES".to_string()]);
        assert!(t.fallback_chain("xx").is_empty());
    }

    #[test]
    fn test_unknown_locale_uses_default() {
        let t = translator();
        let args = TranslateArgs::new().locale("xx-YY").param("name", "Bob");
        assert_eq!(t.translate("greeting", &args), "Hello, Bob!");
    }

    #[test]
    fn test_plural_selection() {
        let t = translator();
        assert_eq!(t.translate("items", &TranslateArgs::new().count(1)), "1 item");
        assert_eq!(t.translate("items", &TranslateArgs::new().count(5)), "5 items");
        // No zero form: falls back to other
        assert_eq!(t.translate("items", &TranslateArgs::new().count(0)), "0 items");
    }

    #[test]
    fn test_plural_without_count_uses_value() {
        let t = translator();
        assert_eq!(t.translate("items", &TranslateArgs::new()), "{{count}} items");
    }

    #[test]
    fn test_count_ignored_for_plain_translation() {
        let t = translator();
        let args = TranslateArgs::new().count(3);
        assert_eq!(t.translate("welcome", &args), "Welcome to RoadLocalize");
        // count is not injected for non-plural text
        let store = Arc::clone(t.store());
        store.add_translation(Translation::new("en-US", "n", "{{count}}"));
        assert_eq!(t.translate("n", &args), "{{count}}");
    }

    #[test]
    fn test_count_overrides_param() {
        let t = translator();
        let args = TranslateArgs::new().count(3).param("count", "many");
        assert_eq!(t.translate("items", &args), "3 items");
    }

    #[test]
    fn test_locale_plural_rule() {
        let store = Arc::new(TranslationStore::new());
        let russian = Locale::new("ru-RU", "Russian", "Русский")
            .with_plural_rule(CldrPluralRule::new("ru").unwrap());
        store.add_locale(russian);
        store
            .load_json(
                "ru-RU",
                &json!({"files": {
                    "one": "{{count}} файл",
                    "few": "{{count}} файла",
                    "many": "{{count}} файлов",
                    "other": "{{count}} файла"
                }}),
                "",
            )
            .unwrap();
        let t = Translator::new(store, "ru-RU");
        assert_eq!(t.translate("files", &TranslateArgs::new().count(1)), "1 файл");
        assert_eq!(t.translate("files", &TranslateArgs::new().count(3)), "3 файла");
        assert_eq!(t.translate("files", &TranslateArgs::new().count(5)), "5 файлов");
        assert_eq!(t.plural_form("ru-RU", 21), PluralForm::One);
    }

    #[test]
    fn test_plural_rule_comes_from_the_locale_that_has_the_key() {
        let store = Arc::new(TranslationStore::with_default_locales());
        store.add_locale(
            Locale::new("ru-RU", "Russian", "Русский")
                .with_plural_rule(CldrPluralRule::new("ru").unwrap()),
        );
        store
            .load_json(
                "en-US",
                &json!({"files": {"one": "{{count}} file", "other": "{{count}} files"}}),
                "",
            )
            .unwrap();
        store
            .load_json(
                "ru-RU",
                &json!({"tasks": {
                    "one": "{{count}} задача",
                    "few": "{{count}} задачи",
                    "many": "{{count}} задач",
                    "other": "{{count}} задачи"
                }}),
                "",
            )
            .unwrap();

        let t = Translator::new(store, "en-US")
            .with_fallback("ru-RU", &["en-US"])
            .with_fallback("ru-UA", &["ru-RU"])
            .with_verbosity(VerbosityLevel::Silent);
        assert_eq!(t.get_verbosity(), VerbosityLevel::Silent);

        // ru-RU has a rule but no entry: en-US has the entry and no rule
        let args = TranslateArgs::new().locale("ru-RU").count(5);
        assert_eq!(t.plural_form("ru-RU", 5), PluralForm::Many);
        assert_eq!(t.translate("files", &args), "5 files");
        let args = TranslateArgs::new().locale("ru-RU").count(0);
        assert_eq!(t.translate("files", &args), "0 files");

        // ru-UA has no locale and no entry: the hit locale ru-RU picks the form
        let args = TranslateArgs::new().locale("ru-UA").count(5);
        assert_eq!(t.translate("tasks", &args), "5 задач");
        let args = TranslateArgs::new().locale("ru-UA").count(22);
        assert_eq!(t.translate("tasks", &args), "22 задачи");
    }

    #[test]
    fn test_malformed_bundle_degrades_to_value() {
        let t = translator();
        t.store()
            .load_json("en-US", &json!({"broken": {"one": "just one"}}), "")
            .unwrap();
        assert_eq!(t.translate("broken", &TranslateArgs::new().count(1)), "just one");
        assert_eq!(t.translate("broken", &TranslateArgs::new().count(4)), "");
    }

    #[test]
    fn test_interpolation() {
        let mut params = Params::new();
        params.insert("name".to_string(), "Alice".to_string());
        params.insert("n".to_string(), "3".to_string());
        assert_eq!(interpolate("Hi {{name}}, {{n}} new", &params), "Hi Alice, 3 new");
        assert_eq!(interpolate("Hi {{who}}", &params), "Hi {{who}}");
        assert_eq!(interpolate("{{ name }}", &params), "{{ name }}");
        assert_eq!(interpolate("no placeholders", &params), "no placeholders");
    }

    #[test]
    fn test_interpolation_does_not_rescan_values() {
        let mut params = Params::new();
        params.insert("a".to_string(), "{{b}}".to_string());
        params.insert("b".to_string(), "oops".to_string());
        assert_eq!(interpolate("{{a}} and {{b}}", &params), "{{b}} and oops");
    }

    #[test]
    fn test_has_translation_is_literal() {
        let t = translator();
        assert!(t.has_translation("welcome", None));
        assert!(t.has_translation("welcome", Some("en-US")));
        assert!(!t.has_translation("welcome", Some("en-GB")));
        assert!(t.has_translation("greeting", Some("es-ES")));
        assert!(!t.has_translation("missing", None));
    }

    #[test]
    fn test_t_shorthand() {
        let t = translator();
        let args = TranslateArgs::new().param("name", "Zoë");
        assert_eq!(t.t("greeting", &args), t.translate("greeting", &args));
    }
}
