//! End-to-end tests through the `I18n` facade: loading, resolution,
//! formatting and concurrent use.

use std::fs;
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use serde_json::json;

use crate::{
    CldrPluralRule, FormatType, I18n, I18nError, Locale, PluralForm, TranslateArgs, Translation,
    VerbosityLevel,
};

fn catalog() -> I18n {
    let i18n = I18n::builder()
        .verbosity(VerbosityLevel::Silent)
        .build()
        .unwrap();
    i18n.load_translations(
        "en-US",
        &json!({
            "welcome": "Welcome",
            "greeting": "Hello, {{name}}!",
            "cart": {
                "items": {"one": "{{count}} item in {{owner}}'s cart", "other": "{{count}} items in {{owner}}'s cart"},
                "empty": "Your cart is empty"
            }
        }),
    )
    .unwrap();
    i18n.load_translations(
        "fr-FR",
        &json!({
            "greeting": "Bonjour, {{name}} !",
            "cart": {"items": {"one": "{{count}} article", "other": "{{count}} articles"}}
        }),
    )
    .unwrap();
    i18n
}

#[test]
fn test_nested_plural_bundle_with_params() {
    let i18n = catalog();
    let args = TranslateArgs::new().count(3).param("owner", "Kim");
    assert_eq!(i18n.t("cart.items", &args), "3 items in Kim's cart");
    let args = TranslateArgs::new().count(1).param("owner", "Kim");
    assert_eq!(i18n.t("cart.items", &args), "1 item in Kim's cart");
}

#[test]
fn test_fr_ca_falls_back_to_fr_fr_then_default() {
    let i18n = catalog();
    i18n.set_locale("fr-CA");
    let args = TranslateArgs::new().param("name", "Luc").count(2);
    assert_eq!(i18n.t("greeting", &args), "Bonjour, Luc !");
    assert_eq!(i18n.t("cart.items", &args), "2 articles");
    assert_eq!(i18n.t("cart.empty", &args), "Your cart is empty");
    assert!(!i18n.has_translation("greeting", Some("fr-CA")));
    assert!(i18n.has_translation("greeting", Some("fr-FR")));
}

#[test]
fn test_missing_everywhere() {
    let i18n = catalog();
    i18n.set_locale("fr-FR");
    assert_eq!(i18n.t("missing.key", &TranslateArgs::new()), "missing.key");
    assert_eq!(
        i18n.t("missing.key", &TranslateArgs::new().default_text("—")),
        "—"
    );
}

#[test]
fn test_param_with_braces_inserted_verbatim() {
    let i18n = catalog();
    let args = TranslateArgs::new().param("name", "{{name}}");
    assert_eq!(i18n.t("greeting", &args), "Hello, {{name}}!");
}

#[test]
fn test_explicit_translation_metadata_survives() {
    let i18n = catalog();
    i18n.store().add_translation(
        Translation::new("en-US", "button.save", "Save")
            .with_context("toolbar")
            .with_metadata("max_length", json!(8)),
    );
    let stored = i18n.store().get_translation("en-US", "button.save").unwrap();
    assert_eq!(stored.context, "toolbar");
    assert_eq!(stored.metadata["max_length"], json!(8));
    assert_eq!(i18n.t("button.save", &TranslateArgs::new()), "Save");
}

#[test]
fn test_registered_locale_with_cldr_rule() {
    let i18n = catalog();
    i18n.add_locale(
        Locale::new("pl-PL", "Polish", "Polski")
            .with_separators(",", " ")
            .with_currency("zł", crate::CurrencyPosition::After)
            .with_plural_rule(CldrPluralRule::new("pl").unwrap()),
    );
    i18n.load_translations(
        "pl-PL",
        &json!({"files": {"one": "{{count}} plik", "few": "{{count}} pliki", "many": "{{count}} plików", "other": "{{count}} pliku"}}),
    )
    .unwrap();

    i18n.set_locale("pl-PL");
    assert_eq!(i18n.t("files", &TranslateArgs::new().count(1)), "1 plik");
    assert_eq!(i18n.t("files", &TranslateArgs::new().count(2)), "2 pliki");
    assert_eq!(i18n.t("files", &TranslateArgs::new().count(5)), "5 plików");
    assert_eq!(i18n.translator().plural_form("pl-PL", 22), PluralForm::Few);
    assert_eq!(i18n.format(1234.5, FormatType::Currency), "1 234,50 zł");
}

#[test]
fn test_load_file_through_facade() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("de-DE.json");
    fs::write(
        &path,
        r#"{"menu": {"file": "Datei", "edit": "Bearbeiten"}, "rows": {"one": "{{count}} Zeile", "other": "{{count}} Zeilen"}}"#,
    )
    .unwrap();

    let i18n = catalog();
    assert_eq!(i18n.load_file("de-DE", &path).unwrap(), 3);
    i18n.set_locale("de-DE");
    assert_eq!(i18n.t("menu.edit", &TranslateArgs::new()), "Bearbeiten");
    assert_eq!(i18n.t("rows", &TranslateArgs::new().count(1)), "1 Zeile");
    assert_eq!(i18n.t("rows", &TranslateArgs::new().count(12)), "12 Zeilen");

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{\"menu\": ").unwrap();
    assert!(matches!(
        i18n.load_file("de-DE", &broken),
        Err(I18nError::Parse { .. })
    ));
}

#[test]
fn test_rtl_locale_info() {
    let i18n = catalog();
    let arabic = i18n.store().get_locale("ar-SA").unwrap();
    assert_eq!(arabic.info().direction, crate::TextDirection::Rtl);
    i18n.set_locale("ar-SA");
    assert_eq!(i18n.format(10, FormatType::Currency), "﷼10");
}

#[test]
fn test_concurrent_requests_keep_their_locale() {
    let i18n = Arc::new(catalog());
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    let requests = [
        ("en-US", "Hello, Ann!", "2025-06-01"),
        ("fr-FR", "Bonjour, Ann !", "01/06/2025"),
    ];
    let handles: Vec<_> = requests
        .into_iter()
        .cycle()
        .take(8)
        .map(|(locale, greeting, formatted)| {
            let i18n = Arc::clone(&i18n);
            thread::spawn(move || {
                i18n.set_locale(locale);
                for _ in 0..100 {
                    let args = TranslateArgs::new().param("name", "Ann");
                    assert_eq!(i18n.t("greeting", &args), greeting);
                    assert_eq!(i18n.format(date, FormatType::Date), formatted);
                    thread::yield_now();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(i18n.get_locale(), "en-US");
}

#[test]
fn test_concurrent_loading_and_reading() {
    let i18n = Arc::new(catalog());

    let writers: Vec<_> = (0..4)
        .map(|worker| {
            let i18n = Arc::clone(&i18n);
            thread::spawn(move || {
                for i in 0..50 {
                    let mut generated = serde_json::Map::new();
                    generated.insert(format!("w{}_{}", worker, i), json!("x"));
                    i18n.load_translations("en-US", &json!({ "generated": generated }))
                        .unwrap();
                }
            })
        })
        .collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let i18n = Arc::clone(&i18n);
            thread::spawn(move || {
                for _ in 0..200 {
                    assert_eq!(i18n.t("welcome", &TranslateArgs::new()), "Welcome");
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }
    // 4 original en-US keys plus 200 generated ones
    assert_eq!(i18n.store().translation_count("en-US"), 4 + 200);
}
