//! Locale records: text direction and formatting conventions for a
//! language/region.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::plural::{PluralForm, PluralRule};

/// Writing direction of a locale's script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Where the currency symbol goes relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyPosition {
    #[default]
    Before,
    /// Amount, one space, symbol: `99,99 €`
    After,
}

/// Formatting conventions for one locale.
///
/// `code` identifies the locale within a store; registering another locale
/// with the same code replaces this one.
#[derive(Debug, Clone)]
pub struct Locale {
    pub code: String,
    pub name: String,
    pub native_name: String,
    pub direction: TextDirection,
    pub date_format: String,
    pub time_format: String,
    pub number_decimal: String,
    pub number_thousand: String,
    pub currency_symbol: String,
    pub currency_position: CurrencyPosition,
    pub plural_rule: Option<Arc<dyn PluralRule>>,
}

/// Serializable summary of a [`Locale`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleInfo {
    pub code: String,
    pub name: String,
    pub native_name: String,
    pub direction: TextDirection,
    pub date_format: String,
    pub time_format: String,
}

impl Locale {
    /// Create a locale with the default (en-US style) conventions.
    pub fn new(code: &str, name: &str, native_name: &str) -> Self {
        Locale {
            code: code.to_string(),
            name: name.to_string(),
            native_name: native_name.to_string(),
            direction: TextDirection::Ltr,
            date_format: "YYYY-MM-DD".to_string(),
            time_format: "HH:mm:ss".to_string(),
            number_decimal: ".".to_string(),
            number_thousand: ",".to_string(),
            currency_symbol: "$".to_string(),
            currency_position: CurrencyPosition::Before,
            plural_rule: None,
        }
    }

    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    pub fn with_time_format(mut self, format: &str) -> Self {
        self.time_format = format.to_string();
        self
    }

    pub fn with_separators(mut self, decimal: &str, thousand: &str) -> Self {
        self.number_decimal = decimal.to_string();
        self.number_thousand = thousand.to_string();
        self
    }

    pub fn with_currency(mut self, symbol: &str, position: CurrencyPosition) -> Self {
        self.currency_symbol = symbol.to_string();
        self.currency_position = position;
        self
    }

    pub fn with_plural_rule(mut self, rule: impl PluralRule + 'static) -> Self {
        self.plural_rule = Some(Arc::new(rule));
        self
    }

    /// Classify `count` with this locale's rule, if it has one.
    pub fn plural_form(&self, count: i64) -> Option<PluralForm> {
        self.plural_rule.as_ref().map(|rule| rule.classify(count))
    }

    pub fn info(&self) -> LocaleInfo {
        LocaleInfo {
            code: self.code.clone(),
            name: self.name.clone(),
            native_name: self.native_name.clone(),
            direction: self.direction,
            date_format: self.date_format.clone(),
            time_format: self.time_format.clone(),
        }
    }
}

/// Locales registered by a store created with
/// [`TranslationStore::with_default_locales`](crate::TranslationStore::with_default_locales).
pub fn default_locales() -> Vec<Locale> {
    vec![
        Locale::new("en-US", "English (US)", "English"),
        Locale::new("en-GB", "English (UK)", "English")
            .with_date_format("DD/MM/YYYY")
            .with_currency("£", CurrencyPosition::Before),
        Locale::new("es-ES", "Spanish", "Español")
            .with_separators(",", ".")
            .with_currency("€", CurrencyPosition::After),
        Locale::new("fr-FR", "French", "Français")
            .with_date_format("DD/MM/YYYY")
            .with_separators(",", " ")
            .with_currency("€", CurrencyPosition::After),
        Locale::new("de-DE", "German", "Deutsch")
            .with_date_format("DD.MM.YYYY")
            .with_separators(",", ".")
            .with_currency("€", CurrencyPosition::After),
        Locale::new("ja-JP", "Japanese", "日本語")
            .with_date_format("YYYY年MM月DD日")
            .with_currency("¥", CurrencyPosition::Before),
        Locale::new("ar-SA", "Arabic", "العربية")
            .with_direction(TextDirection::Rtl)
            .with_currency("﷼", CurrencyPosition::Before),
    ]
}
