//! Plural categories and the strategies that select them.
//!
//! A [`PluralRule`] maps an integer count to one of the six CLDR categories.
//! [`DefaultPluralRule`] is the simplistic English-like rule used when a
//! locale has no rule of its own; [`CldrPluralRule`] defers to the ICU
//! plural data for a real language.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use icu_locale::Locale;
use icu_plurals::{PluralCategory, PluralRuleType, PluralRules};
use serde::{Deserialize, Serialize};

use crate::error::{I18nError, Result};

/// Grammatical-number category used to pick a plural variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralForm {
    Zero,
    One,
    Two,
    Few,
    Many,
    /// Mandatory fallback every plural bundle must provide
    Other,
}

impl PluralForm {
    pub const ALL: [PluralForm; 6] = [
        PluralForm::Zero,
        PluralForm::One,
        PluralForm::Two,
        PluralForm::Few,
        PluralForm::Many,
        PluralForm::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluralForm::Zero => "zero",
            PluralForm::One => "one",
            PluralForm::Two => "two",
            PluralForm::Few => "few",
            PluralForm::Many => "many",
            PluralForm::Other => "other",
        }
    }
}

impl fmt::Display for PluralForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluralForm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PluralForm::ALL
            .into_iter()
            .find(|form| form.as_str() == s)
            .ok_or_else(|| format!("Unknown plural category: {}", s))
    }
}

impl From<PluralCategory> for PluralForm {
    #[allow(unreachable_patterns)]
    fn from(category: PluralCategory) -> Self {
        match category {
            PluralCategory::Zero => PluralForm::Zero,
            PluralCategory::One => PluralForm::One,
            PluralCategory::Two => PluralForm::Two,
            PluralCategory::Few => PluralForm::Few,
            PluralCategory::Many => PluralForm::Many,
            PluralCategory::Other => PluralForm::Other,
            _ => PluralForm::Other,
        }
    }
}

/// Strategy that classifies a count into a plural category.
///
/// Stored on a [`Locale`](crate::Locale) and shared between threads, hence
/// the `Send + Sync` bound.
pub trait PluralRule: fmt::Debug + Send + Sync {
    fn classify(&self, count: i64) -> PluralForm;
}

/// English-like rule: 0 → zero, 1 → one, anything else → other.
///
/// Bundles rarely carry a `zero` form, in which case resolution falls back
/// to `other` ("0 items").
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPluralRule;

impl PluralRule for DefaultPluralRule {
    fn classify(&self, count: i64) -> PluralForm {
        match count {
            0 => PluralForm::Zero,
            1 => PluralForm::One,
            _ => PluralForm::Other,
        }
    }
}

/// Cardinal plural rule backed by the CLDR data compiled into `icu_plurals`.
#[derive(Debug, Clone)]
pub struct CldrPluralRule {
    locale: Locale,
}

impl CldrPluralRule {
    /// Create a rule for a BCP 47 locale code such as `"ru"` or `"ar-SA"`.
    ///
    /// # Errors
    /// Returns [`I18nError::InvalidLocale`] when the code does not parse or
    /// no plural data exists for it.
    pub fn new(locale_str: &str) -> Result<Self> {
        let locale: Locale = locale_str.parse().map_err(|e| I18nError::InvalidLocale {
            locale: locale_str.to_string(),
            reason: format!("{}", e),
        })?;
        let rule = CldrPluralRule { locale };
        rule.rules().map_err(|reason| I18nError::InvalidLocale {
            locale: locale_str.to_string(),
            reason,
        })?;
        Ok(rule)
    }

    fn rules(&self) -> std::result::Result<PluralRules, String> {
        PluralRules::try_new(self.locale.clone().into(), PluralRuleType::Cardinal.into())
            .map_err(|e| format!("Failed to create PluralRules: {}", e))
    }
}

thread_local! {
    // `PluralRules` is only `Send` with icu's `sync` feature; keep one copy per thread
    static LOADED_RULES: RefCell<HashMap<String, PluralRules>> = RefCell::new(HashMap::new());
}

impl PluralRule for CldrPluralRule {
    fn classify(&self, count: i64) -> PluralForm {
        let n = usize::try_from(count.unsigned_abs()).unwrap_or(usize::MAX);
        LOADED_RULES.with(|loaded| {
            let mut loaded = loaded.borrow_mut();
            let key = self.locale.to_string();
            if !loaded.contains_key(&key) {
                match self.rules() {
                    Ok(rules) => {
                        loaded.insert(key.clone(), rules);
                    }
                    Err(reason) => {
                        tracing::warn!("{}; using default plural rule", reason);
                        return DefaultPluralRule.classify(count);
                    }
                }
            }
            match loaded.get(&key) {
                Some(rules) => rules.category_for(n).into(),
                None => DefaultPluralRule.classify(count),
            }
        })
    }
}
