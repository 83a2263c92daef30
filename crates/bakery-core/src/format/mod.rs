//! Message formatters
//!
//! A [`Formatter`] renders a stored template against a variable bag. The
//! engine ships two: [`MustacheFormatter`] for `{{path}}` placeholders and
//! [`IcuFormatter`] for the plural/select/selectordinal subset of ICU
//! MessageFormat.
//!
//! Both formatters share one escaping policy: when `escape_html` is set
//! (the default) every substituted variable is HTML-escaped, and template
//! text is never touched.

mod icu;
mod mustache;

pub use icu::IcuFormatter;
pub use mustache::MustacheFormatter;

use crate::plural::PluralRulesCache;
use bakery_common::{escape_html, Vars};
use bakery_config::MessageFormat;
use std::sync::Arc;

/// Renders templates against variables.
pub trait Formatter: Send + Sync {
    /// Renders `template`. Without variables the template is returned as is.
    fn interpolate(&self, template: &str, vars: Option<&Vars>) -> String;

    /// Called when the active locale changes.
    fn set_locale(&self, _locale: &str) {}
}

/// Builds the formatter selected by `format`.
pub fn build_formatter(
    format: MessageFormat,
    locale: &str,
    escape_html: bool,
    rules: Arc<PluralRulesCache>,
) -> Box<dyn Formatter> {
    match format {
        MessageFormat::Mustache => Box::new(MustacheFormatter::new(escape_html)),
        MessageFormat::Icu => Box::new(IcuFormatter::new(locale, escape_html, rules)),
    }
}

fn render_value(text: String, escape: bool) -> String {
    if escape {
        escape_html(&text)
    } else {
        text
    }
}
