use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::plural::PluralForm;

/// One key's text for one locale.
///
/// `plural_forms` is empty for plain strings. When it is not empty it is
/// expected to hold a [`PluralForm::Other`] entry; `value` mirrors that
/// entry so callers without a count still get sensible text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub key: String,
    pub locale: String,
    pub value: String,
    pub plural_forms: BTreeMap<PluralForm, String>,
    pub context: String,
    pub metadata: Map<String, Value>,
}

impl Translation {
    pub fn new(locale: &str, key: &str, value: &str) -> Self {
        Translation {
            key: key.to_string(),
            locale: locale.to_string(),
            value: value.to_string(),
            plural_forms: BTreeMap::new(),
            context: String::new(),
            metadata: Map::new(),
        }
    }

    /// Build a pluralized translation; `value` is taken from the `other` form.
    pub fn plural(locale: &str, key: &str, forms: BTreeMap<PluralForm, String>) -> Self {
        let value = forms.get(&PluralForm::Other).cloned().unwrap_or_default();
        Translation {
            plural_forms: forms,
            ..Translation::new(locale, key, &value)
        }
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = context.to_string();
        self
    }

    pub fn with_metadata(mut self, name: &str, value: Value) -> Self {
        self.metadata.insert(name.to_string(), value);
        self
    }

    pub fn is_plural(&self) -> bool {
        !self.plural_forms.is_empty()
    }

    /// Text for `form`, falling back to `other`, then to `value`.
    pub fn text_for(&self, form: PluralForm) -> &str {
        self.plural_forms
            .get(&form)
            .or_else(|| self.plural_forms.get(&PluralForm::Other))
            .map(String::as_str)
            .unwrap_or(&self.value)
    }
}
