//! Locale-aware rendering of numbers, currency, percentages, dates and times.
//!
//! Date and time patterns are scanned left to right. At each position the
//! longest matching token (`YYYY` before `YY`) is replaced and scanning
//! resumes after it, so substituted digits are never read as tokens again.
//! Everything that is not a token, such as `/`, `.` or `年`, is copied as is.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::locale::{CurrencyPosition, Locale};

pub const DEFAULT_DECIMALS: usize = 2;
pub const DEFAULT_PERCENT_DECIMALS: usize = 1;

/// A numeric value to format.
///
/// Integers never render a fractional part; floats are rounded to the
/// requested number of decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Number {
            fn from(value: $ty) -> Self {
                Number::Int(i64::from(value))
            }
        })*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(f64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl FromStr for Number {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = s.parse::<i64>() {
            return Ok(Number::Int(value));
        }
        s.parse::<f64>()
            .map(Number::Float)
            .map_err(|_| format!("Not a number: {}", s))
    }
}

/// A value handed to [`Formatter::format`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormatValue {
    Number(Number),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

macro_rules! format_value_from_number {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FormatValue {
            fn from(value: $ty) -> Self {
                FormatValue::Number(value.into())
            }
        })*
    };
}

format_value_from_number!(i8, i16, i32, i64, u8, u16, u32, f32, f64, Number);

impl From<NaiveDate> for FormatValue {
    fn from(value: NaiveDate) -> Self {
        FormatValue::Date(value)
    }
}

impl From<NaiveDateTime> for FormatValue {
    fn from(value: NaiveDateTime) -> Self {
        FormatValue::DateTime(value)
    }
}

impl From<&str> for FormatValue {
    fn from(value: &str) -> Self {
        FormatValue::Text(value.to_string())
    }
}

impl From<String> for FormatValue {
    fn from(value: String) -> Self {
        FormatValue::Text(value)
    }
}

/// How [`Formatter::format`] should render a value.
///
/// An explicit type is used when it applies to the value (currency and
/// percentage only apply to numbers, date only to dates); otherwise the
/// value's own kind decides, as with `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatType {
    #[default]
    Auto,
    Number,
    Currency,
    Date,
    Percentage,
}

impl FromStr for FormatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(FormatType::Auto),
            "number" => Ok(FormatType::Number),
            "currency" => Ok(FormatType::Currency),
            "date" => Ok(FormatType::Date),
            "percentage" => Ok(FormatType::Percentage),
            other => Err(format!("Unknown format type: {}", other)),
        }
    }
}

impl fmt::Display for FormatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatType::Auto => "auto",
            FormatType::Number => "number",
            FormatType::Currency => "currency",
            FormatType::Date => "date",
            FormatType::Percentage => "percentage",
        };
        f.write_str(name)
    }
}

/// Renders values with the conventions of a single locale.
#[derive(Debug, Clone)]
pub struct Formatter {
    locale: Locale,
}

impl Formatter {
    pub fn new(locale: Locale) -> Self {
        Formatter { locale }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Group the integer part with the thousands separator and, for floats,
    /// round to `decimals` places using the locale's decimal separator.
    pub fn number(&self, value: impl Into<Number>, decimals: usize) -> String {
        match value.into() {
            Number::Int(value) => {
                let digits = group_digits(
                    &value.unsigned_abs().to_string(),
                    &self.locale.number_thousand,
                );
                if value < 0 {
                    format!("-{}", digits)
                } else {
                    digits
                }
            }
            Number::Float(value) => self.float(value, decimals),
        }
    }

    fn float(&self, value: f64, decimals: usize) -> String {
        if !value.is_finite() {
            return value.to_string();
        }

        let rendered = format!("{:.*}", decimals, value);
        let (sign, unsigned) = match rendered.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", rendered.as_str()),
        };

        let mut result = String::from(sign);
        match unsigned.split_once('.') {
            Some((integer, fraction)) => {
                result.push_str(&group_digits(integer, &self.locale.number_thousand));
                result.push_str(&self.locale.number_decimal);
                result.push_str(fraction);
            }
            None => result.push_str(&group_digits(unsigned, &self.locale.number_thousand)),
        }
        result
    }

    /// Format an amount with two decimals and place the symbol per locale.
    pub fn currency(&self, value: impl Into<Number>, symbol: Option<&str>) -> String {
        let symbol = symbol.unwrap_or(&self.locale.currency_symbol);
        let amount = self.number(value, DEFAULT_DECIMALS);
        match self.locale.currency_position {
            CurrencyPosition::Before => format!("{}{}", symbol, amount),
            CurrencyPosition::After => format!("{} {}", amount, symbol),
        }
    }

    /// Render `YYYY`, `YY`, `MM` and `DD` tokens of `format` (default: the
    /// locale's date format).
    pub fn date<D: Datelike>(&self, value: &D, format: Option<&str>) -> String {
        let pattern = format.unwrap_or(&self.locale.date_format);
        substitute_tokens(pattern, &date_tokens(value))
    }

    /// Render `HH`, `mm` and `ss` tokens of `format` (default: the locale's
    /// time format).
    pub fn time<T: Timelike>(&self, value: &T, format: Option<&str>) -> String {
        let pattern = format.unwrap_or(&self.locale.time_format);
        substitute_tokens(pattern, &time_tokens(value))
    }

    /// Render date and time tokens together. The default pattern is the
    /// locale's date format, a space, and its time format.
    pub fn datetime<T: Datelike + Timelike>(&self, value: &T, format: Option<&str>) -> String {
        let default_pattern;
        let pattern = match format {
            Some(pattern) => pattern,
            None => {
                default_pattern =
                    format!("{} {}", self.locale.date_format, self.locale.time_format);
                &default_pattern
            }
        };
        let mut tokens = date_tokens(value).to_vec();
        tokens.extend(time_tokens(value));
        substitute_tokens(pattern, &tokens)
    }

    /// `number(value * 100, decimals)` followed by `%`.
    pub fn percentage(&self, value: impl Into<Number>, decimals: usize) -> String {
        let scaled = match value.into() {
            Number::Int(value) => Number::Int(value.saturating_mul(100)),
            Number::Float(value) => Number::Float(value * 100.0),
        };
        format!("{}%", self.number(scaled, decimals))
    }

    /// Render a value according to `format_type`, with default decimals and
    /// patterns.
    pub fn format(&self, value: &FormatValue, format_type: FormatType) -> String {
        match (value, format_type) {
            (FormatValue::Number(number), FormatType::Currency) => self.currency(*number, None),
            (FormatValue::Number(number), FormatType::Percentage) => {
                self.percentage(*number, DEFAULT_PERCENT_DECIMALS)
            }
            (FormatValue::Number(number), _) => self.number(*number, DEFAULT_DECIMALS),
            (FormatValue::Date(date), _) => self.date(date, None),
            (FormatValue::DateTime(datetime), _) => self.date(datetime, None),
            (FormatValue::Text(text), _) => text.clone(),
        }
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(ch);
    }
    grouped
}

// Longest tokens first: YYYY must win over YY at the same position.
fn date_tokens<D: Datelike>(value: &D) -> [(&'static str, String); 4] {
    let year = value.year();
    [
        ("YYYY", format!("{:04}", year)),
        ("YY", format!("{:02}", year.rem_euclid(100))),
        ("MM", format!("{:02}", value.month())),
        ("DD", format!("{:02}", value.day())),
    ]
}

fn time_tokens<T: Timelike>(value: &T) -> [(&'static str, String); 3] {
    [
        ("HH", format!("{:02}", value.hour())),
        ("mm", format!("{:02}", value.minute())),
        ("ss", format!("{:02}", value.second())),
    ]
}

fn substitute_tokens(pattern: &str, tokens: &[(&str, String)]) -> String {
    let mut result = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;
    'scan: while let Some(ch) = rest.chars().next() {
        for (token, value) in tokens {
            if let Some(after) = rest.strip_prefix(token) {
                result.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        result.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    result
}
