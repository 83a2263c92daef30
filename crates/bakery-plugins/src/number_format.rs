//! Locale-aware number tokens.
//!
//! After rendering, tokens of the form `{var|format}` or
//! `{var|format:options}` are replaced when `var` is a number:
//!
//! | Format             | Example output (`en`) |
//! |--------------------|-----------------------|
//! | `number`/`decimal` | `1,234.56`            |
//! | `decimal:1`        | `1,234.6`             |
//! | `currency[:CODE]`  | `$1,234.56`           |
//! | `percent`          | `75.50%`              |
//! | `compact`          | `1.5M`                |
//!
//! Tokens whose variable is missing or not numeric are left in place.

use bakery_common::{format_number, numeric_value, Vars};
use bakery_core::{Plugin, PluginContext, PluginKind, PluginMetadata};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::{Captures, Regex};
use tracing::debug;

static NUMBER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(\w+)\|(\w+)(?::([^}]+))?\}").expect("Invalid number token regex pattern")
});

const DEFAULT_CURRENCY: &str = "USD";
const NBSP: &str = "\u{a0}";
const NARROW_NBSP: &str = "\u{202f}";

/// Grouping and decimal separators of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Separators {
    group: &'static str,
    decimal: &'static str,
    /// Symbols and `%` follow the number, separated by a space.
    symbol_after: bool,
}

impl Separators {
    fn for_locale(locale: &str) -> Self {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "de" | "es" | "it" | "pt" | "nl" => Self {
                group: ".",
                decimal: ",",
                symbol_after: true,
            },
            "fr" => Self {
                group: NARROW_NBSP,
                decimal: ",",
                symbol_after: true,
            },
            _ => Self {
                group: ",",
                decimal: ".",
                symbol_after: false,
            },
        }
    }
}

/// Formatter plugin rewriting `{var|format}` tokens.
#[derive(Debug)]
pub struct NumberFormatPlugin {
    metadata: PluginMetadata,
    locale: RwLock<String>,
}

impl NumberFormatPlugin {
    /// Creates the plugin; `en` formatting until told otherwise.
    pub fn new() -> Self {
        Self {
            metadata: PluginMetadata::new("number-format", "1.0.0", PluginKind::Formatter)
                .with_description("Formats numbers, currencies, and percentages")
                .with_author("i18n-bakery"),
            locale: RwLock::new("en".to_string()),
        }
    }

    /// Locale used when a context carries none.
    pub fn locale(&self) -> String {
        self.locale.read().clone()
    }

    /// Rewrites every number token in `text`.
    pub fn format_tokens(&self, text: &str, vars: &Vars, locale: &str) -> String {
        let locale = if locale.is_empty() {
            self.locale()
        } else {
            locale.to_string()
        };
        let separators = Separators::for_locale(&locale);

        NUMBER_TOKEN
            .replace_all(text, |caps: &Captures<'_>| {
                let Some(value) = vars.get(&caps[1]).and_then(numeric_value) else {
                    return caps[0].to_string();
                };
                let options = caps.get(3).map(|m| m.as_str().trim());
                format_value(value, &caps[2], options, separators)
            })
            .into_owned()
    }
}

impl Default for NumberFormatPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for NumberFormatPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn init(&self, options: &Vars) -> anyhow::Result<()> {
        if let Some(locale) = options.get("locale").and_then(|v| v.as_str()) {
            *self.locale.write() = locale.to_string();
        }
        Ok(())
    }

    fn after_translate(&self, context: &PluginContext) -> anyhow::Result<Option<String>> {
        let (Some(result), Some(vars)) = (context.result.as_deref(), context.vars.as_ref()) else {
            return Ok(None);
        };
        if !NUMBER_TOKEN.is_match(result) {
            return Ok(None);
        }
        Ok(Some(self.format_tokens(result, vars, &context.locale)))
    }

    fn on_locale_change(&self, _old: &str, new: &str) -> anyhow::Result<()> {
        *self.locale.write() = new.to_string();
        Ok(())
    }
}

fn format_value(value: f64, format: &str, options: Option<&str>, separators: Separators) -> String {
    match format {
        "number" | "decimal" => {
            let digits = options.and_then(|o| o.parse::<usize>().ok());
            match digits {
                Some(digits) => format_fixed(value, digits, separators),
                None => format_trimmed(value, 3, separators),
            }
        }
        "currency" => format_currency(value, options.unwrap_or(DEFAULT_CURRENCY), separators),
        "percent" => {
            let number = format_fixed(value, 2, separators);
            if separators.symbol_after {
                format!("{number}{NBSP}%")
            } else {
                format!("{number}%")
            }
        }
        "compact" => format_compact(value, separators),
        other => {
            debug!(format = other, "Unknown number format, rendering plain value");
            format_number(value)
        }
    }
}

/// `value` with exactly `digits` fraction digits and grouped thousands.
fn format_fixed(value: f64, digits: usize, separators: Separators) -> String {
    let formatted = format!("{:.*}", digits, value.abs());
    let (integer, fraction) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), ""));

    let mut out = String::with_capacity(formatted.len() + integer.len() / 3 + 1);
    if value.is_sign_negative() && formatted.bytes().any(|b| (b'1'..=b'9').contains(&b)) {
        out.push('-');
    }
    out.push_str(&group_digits(integer, separators.group));
    if !fraction.is_empty() {
        out.push_str(separators.decimal);
        out.push_str(fraction);
    }
    out
}

/// Like [`format_fixed`] with trailing fraction zeros removed.
fn format_trimmed(value: f64, max_digits: usize, separators: Separators) -> String {
    let fixed = format_fixed(value, max_digits, separators);
    match fixed.rsplit_once(separators.decimal) {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                integer.to_string()
            } else {
                format!("{integer}{}{fraction}", separators.decimal)
            }
        }
        None => fixed,
    }
}

fn group_digits(integer: &str, group: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3 * group.len());
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(group);
        }
        out.push(c);
    }
    out
}

fn format_currency(value: f64, code: &str, separators: Separators) -> String {
    let code = code.to_ascii_uppercase();
    let (symbol, digits) = match code.as_str() {
        "USD" => ("$".to_string(), 2),
        "EUR" => ("€".to_string(), 2),
        "GBP" => ("£".to_string(), 2),
        "JPY" => ("¥".to_string(), 0),
        _ => (code.clone(), 2),
    };
    let number = format_fixed(value.abs(), digits, separators);
    let sign = if value < 0.0 { "-" } else { "" };

    if separators.symbol_after {
        format!("{sign}{number}{NBSP}{symbol}")
    } else if symbol.len() > 1 && symbol.chars().all(|c| c.is_ascii_alphabetic()) {
        format!("{sign}{symbol}{NBSP}{number}")
    } else {
        format!("{sign}{symbol}{number}")
    }
}

fn format_compact(value: f64, separators: Separators) -> String {
    let magnitude = value.abs();
    let (scaled, suffix) = if magnitude >= 1e9 {
        (value / 1e9, "B")
    } else if magnitude >= 1e6 {
        (value / 1e6, "M")
    } else if magnitude >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    let digits = usize::from(scaled.abs() < 10.0);
    format!("{}{suffix}", format_trimmed(scaled, digits, separators))
}
