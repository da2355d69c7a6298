//! Current-locale tracking and formatter caching.
//!
//! The current locale is kept in thread-local storage, keyed by the id of
//! the [`LocaleManager`] that set it. Two threads (for example two request
//! handlers) never see each other's locale, and two managers on the same
//! thread do not interfere either.
//!
//! Dropping a manager clears only the dropping thread's entry. Entries set
//! on other threads stay until those threads exit or call
//! [`LocaleManager::clear_current`]; long-lived worker pools that create
//! many short-lived managers should clear before the manager goes away.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Datelike, Timelike};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::formatter::{DEFAULT_DECIMALS, DEFAULT_PERCENT_DECIMALS, Formatter, Number};
use crate::locale::Locale;
use crate::translator::{TranslateArgs, Translator};

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_LOCALES: RefCell<HashMap<u64, String>> = RefCell::new(HashMap::new());
}

#[derive(Debug)]
pub struct LocaleManager {
    id: u64,
    translator: Arc<Translator>,
    // Never evicted: bounded by the number of distinct locale codes requested
    formatters: Mutex<HashMap<String, Arc<Formatter>>>,
}

impl LocaleManager {
    pub fn new(translator: Arc<Translator>) -> Self {
        LocaleManager {
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            translator,
            formatters: Mutex::new(HashMap::new()),
        }
    }

    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    fn explicit_locale(&self) -> Option<String> {
        CURRENT_LOCALES.with(|locales| locales.borrow().get(&self.id).cloned())
    }

    /// The current thread's locale, or the translator's default locale if
    /// none was set on this thread.
    pub fn current(&self) -> String {
        self.explicit_locale()
            .unwrap_or_else(|| self.translator.default_locale().to_string())
    }

    pub fn set_current(&self, locale: &str) {
        CURRENT_LOCALES.with(|locales| {
            locales.borrow_mut().insert(self.id, locale.to_string());
        });
    }

    /// Forget the current thread's locale so [`current`](Self::current)
    /// reports the default again.
    pub fn clear_current(&self) {
        CURRENT_LOCALES.with(|locales| {
            locales.borrow_mut().remove(&self.id);
        });
    }

    /// Switch the current thread to `locale` until the returned guard is
    /// dropped.
    ///
    /// ```
    /// use roadlocalize::I18n;
    ///
    /// let i18n = I18n::new("en-US");
    /// {
    ///     let _guard = i18n.locale_manager().scoped("de-DE");
    ///     assert_eq!(i18n.get_locale(), "de-DE");
    /// }
    /// assert_eq!(i18n.get_locale(), "en-US");
    /// ```
    pub fn scoped(&self, locale: &str) -> LocaleGuard<'_> {
        let previous = self.explicit_locale();
        self.set_current(locale);
        LocaleGuard {
            manager: self,
            previous,
            _not_send: PhantomData,
        }
    }

    /// Cached formatter for `locale` (default: the current locale).
    ///
    /// A code with no registered locale gets a formatter for the default
    /// locale, cached under the requested code.
    pub fn get_formatter(&self, locale: Option<&str>) -> Arc<Formatter> {
        let code = locale.map_or_else(|| self.current(), str::to_string);

        let mut formatters = self.formatters.lock();
        if let Some(formatter) = formatters.get(&code) {
            return Arc::clone(formatter);
        }

        let formatter = Arc::new(Formatter::new(self.resolve_locale(&code)));
        formatters.insert(code, Arc::clone(&formatter));
        formatter
    }

    fn resolve_locale(&self, code: &str) -> Locale {
        let store = self.translator.store();
        if let Some(locale) = store.get_locale(code) {
            return locale;
        }

        let default_code = self.translator.default_locale();
        debug!(
            "No locale '{}' registered, formatting with '{}'",
            code, default_code
        );
        store.get_locale(default_code).unwrap_or_else(|| {
            warn!(
                "Default locale '{}' is not registered, using built-in conventions",
                default_code
            );
            Locale::new(default_code, default_code, default_code)
        })
    }

    /// Translate in the current locale unless `args` names one.
    pub fn t(&self, key: &str, args: &TranslateArgs) -> String {
        if args.locale.is_some() {
            return self.translator.translate(key, args);
        }
        let args = args.clone().locale(&self.current());
        self.translator.translate(key, &args)
    }

    pub fn format_number(&self, value: impl Into<Number>) -> String {
        self.get_formatter(None).number(value, DEFAULT_DECIMALS)
    }

    pub fn format_currency(&self, value: impl Into<Number>, symbol: Option<&str>) -> String {
        self.get_formatter(None).currency(value, symbol)
    }

    pub fn format_date<D: Datelike>(&self, value: &D) -> String {
        self.get_formatter(None).date(value, None)
    }

    pub fn format_time<T: Timelike>(&self, value: &T) -> String {
        self.get_formatter(None).time(value, None)
    }

    pub fn format_percentage(&self, value: impl Into<Number>) -> String {
        self.get_formatter(None)
            .percentage(value, DEFAULT_PERCENT_DECIMALS)
    }
}

impl Drop for LocaleManager {
    fn drop(&mut self) {
        // Other threads' entries cannot be reached; ids are never reused.
        let _ = CURRENT_LOCALES.try_with(|locales| {
            locales.borrow_mut().remove(&self.id);
        });
    }
}

/// Restores the previous current locale when dropped.
///
/// Bound to the thread that created it.
#[must_use = "the locale is restored as soon as the guard is dropped"]
pub struct LocaleGuard<'a> {
    manager: &'a LocaleManager,
    previous: Option<String>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for LocaleGuard<'_> {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(locale) => self.manager.set_current(&locale),
            None => self.manager.clear_current(),
        }
    }
}
