//! ICU MessageFormat subset: `plural`, `select`, `selectordinal` and `{var}`.
//!
//! Patterns are located with a marker regex and then delimited with a
//! brace-depth scan, so clause bodies may contain further patterns:
//!
//! ```text
//! {gender, select, male {He has {count, plural, one {# item} other {# items}}} other {...}}
//! ```
//!
//! Resolution runs in passes until the text stops changing. Each pass
//! rescans from the point of every replacement, which is how nested
//! patterns surfaced by an outer replacement get resolved. Text taken from
//! a variable (a `select` with no matching clause) is never rescanned: it
//! is parked in a literal slot and written back after the last pass.

use super::{render_value, Formatter};
use crate::plural::{ordinal_category, PluralRulesCache};
use bakery_common::{display_value, format_number, numeric_value, Vars};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::Arc;
use tracing::{trace, warn};

static PLURAL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+),\s*plural,\s*").expect("Invalid plural regex pattern"));
static SELECT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+),\s*select,\s*").expect("Invalid select regex pattern"));
static ORDINAL_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(\w+),\s*selectordinal,\s*").expect("Invalid selectordinal regex pattern")
});
static SIMPLE_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("Invalid variable regex pattern"));
static LITERAL_SLOT: Lazy<Regex> =
    Lazy::new(|| Regex::new("\u{E000}(\\d+)\u{E001}").expect("Invalid literal slot regex pattern"));

/// Upper bound on resolution passes over one template.
const MAX_PASSES: usize = 32;

#[derive(Debug, Clone, Copy)]
enum PatternKind {
    Plural,
    Select,
    SelectOrdinal,
}

impl PatternKind {
    const PASS_ORDER: [Self; 3] = [Self::Plural, Self::Select, Self::SelectOrdinal];

    fn marker(self) -> &'static Regex {
        match self {
            Self::Plural => &PLURAL_MARKER,
            Self::Select => &SELECT_MARKER,
            Self::SelectOrdinal => &ORDINAL_MARKER,
        }
    }
}

/// Text replacing a resolved pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Replacement {
    /// Clause body from the template; may hold further patterns.
    Template(String),
    /// Already rendered variable text, never parsed again.
    Literal(String),
}

/// One `selector {body}` clause of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clause<'a> {
    selector: &'a str,
    body: &'a str,
}

/// Formatter for ICU-style messages.
///
/// Plural categories come from the CLDR rules of the current locale, which
/// follows [`Formatter::set_locale`].
#[derive(Debug)]
pub struct IcuFormatter {
    locale: RwLock<String>,
    escape_html: bool,
    rules: Arc<PluralRulesCache>,
}

impl IcuFormatter {
    /// Creates a formatter for `locale`.
    pub fn new(locale: impl Into<String>, escape_html: bool, rules: Arc<PluralRulesCache>) -> Self {
        Self {
            locale: RwLock::new(locale.into()),
            escape_html,
            rules,
        }
    }

    /// Locale used for plural categories.
    pub fn locale(&self) -> String {
        self.locale.read().clone()
    }

    fn resolve_kind(
        &self,
        input: &str,
        kind: PatternKind,
        vars: &Vars,
        literals: &mut Vec<String>,
    ) -> String {
        let mut result = input.to_string();
        let mut cursor = 0;

        while cursor <= result.len() {
            let Some((start, options_start, name)) = kind
                .marker()
                .captures_at(&result, cursor)
                .and_then(|caps| {
                    let whole = caps.get(0)?;
                    Some((whole.start(), whole.end(), caps.get(1)?.as_str().to_string()))
                })
            else {
                break;
            };

            let Some(close) = find_matching_brace(&result, start) else {
                trace!(pattern = &result[start..], "Unbalanced ICU pattern left as is");
                cursor = options_start;
                continue;
            };

            let options = &result[options_start..close];
            match self.select_clause(kind, vars.get(&name), options) {
                Some(Replacement::Template(body)) => {
                    result.replace_range(start..=close, &body);
                    cursor = start;
                }
                Some(Replacement::Literal(text)) => {
                    let slot = format!("\u{E000}{}\u{E001}", literals.len());
                    literals.push(text);
                    result.replace_range(start..=close, &slot);
                    cursor = start + slot.len();
                }
                None => cursor = options_start,
            }
        }

        result
    }

    fn select_clause(
        &self,
        kind: PatternKind,
        value: Option<&Value>,
        options: &str,
    ) -> Option<Replacement> {
        let clauses = parse_clauses(options);
        match kind {
            PatternKind::Select => {
                let value = display_value(value?)?;
                let body = find_clause(&clauses, &value).or_else(|| find_clause(&clauses, "other"));
                Some(body.map_or_else(
                    || Replacement::Literal(render_value(value, self.escape_html)),
                    |body| Replacement::Template(body.to_string()),
                ))
            }
            PatternKind::Plural | PatternKind::SelectOrdinal => {
                let count = numeric_value(value?)?;
                let locale = self.locale.read().clone();
                let category = match kind {
                    PatternKind::SelectOrdinal => ordinal_category(count, &locale, &self.rules),
                    _ => self.rules.category(count, &locale),
                };
                let number = format_number(count);
                let body = find_exact_clause(&clauses, count)
                    .or_else(|| find_clause(&clauses, category.as_str()))
                    .or_else(|| find_clause(&clauses, "other"));
                Some(Replacement::Template(
                    body.map_or_else(|| number.clone(), |body| body.replace('#', &number)),
                ))
            }
        }
    }

    fn substitute_variables(&self, input: &str, vars: &Vars) -> String {
        SIMPLE_VARIABLE
            .replace_all(input, |caps: &Captures<'_>| {
                vars.get(&caps[1])
                    .and_then(display_value)
                    .map(|text| render_value(text, self.escape_html))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl Formatter for IcuFormatter {
    fn interpolate(&self, template: &str, vars: Option<&Vars>) -> String {
        let Some(vars) = vars else {
            return template.to_string();
        };

        let mut literals = Vec::new();
        let mut result = template.to_string();
        for pass in 1..=MAX_PASSES {
            let before = result.clone();
            for kind in PatternKind::PASS_ORDER {
                result = self.resolve_kind(&result, kind, vars, &mut literals);
            }
            if result == before {
                break;
            }
            if pass == MAX_PASSES {
                warn!(passes = MAX_PASSES, "ICU message did not settle, rendering as is");
            }
        }

        let result = self.substitute_variables(&result, vars);
        restore_literals(&result, &literals)
    }

    fn set_locale(&self, locale: &str) {
        *self.locale.write() = locale.to_string();
    }
}

/// Writes parked variable text back into its slots.
fn restore_literals(text: &str, literals: &[String]) -> String {
    if literals.is_empty() {
        return text.to_string();
    }
    LITERAL_SLOT
        .replace_all(text, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| literals.get(index))
                .map_or_else(|| caps[0].to_string(), Clone::clone)
        })
        .into_owned()
}

/// Byte index of the `}` closing the `{` at `open`.
fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in text.as_bytes().get(open..)?.iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits `one {# item} other {# items}` into top-level clauses.
///
/// Parsing stops at the first malformed clause; earlier clauses still count.
fn parse_clauses(options: &str) -> Vec<Clause<'_>> {
    let bytes = options.as_bytes();
    let skip_whitespace = |mut pos: usize| {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        pos
    };

    let mut clauses = Vec::new();
    let mut pos = skip_whitespace(0);
    while pos < bytes.len() {
        let selector_start = pos;
        while pos < bytes.len() && bytes[pos] != b'{' && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let selector = &options[selector_start..pos];
        pos = skip_whitespace(pos);

        if selector.is_empty() || bytes.get(pos) != Some(&b'{') {
            break;
        }
        let Some(close) = find_matching_brace(options, pos) else {
            break;
        };
        clauses.push(Clause {
            selector,
            body: &options[pos + 1..close],
        });
        pos = skip_whitespace(close + 1);
    }
    clauses
}

fn find_clause<'a>(clauses: &[Clause<'a>], selector: &str) -> Option<&'a str> {
    clauses
        .iter()
        .find(|clause| clause.selector == selector)
        .map(|clause| clause.body)
}

fn find_exact_clause<'a>(clauses: &[Clause<'a>], count: f64) -> Option<&'a str> {
    clauses
        .iter()
        .find(|clause| {
            clause
                .selector
                .strip_prefix('=')
                .and_then(|n| n.parse::<f64>().ok())
                .is_some_and(|n| n == count)
        })
        .map(|clause| clause.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakery_common::vars;

    fn formatter(locale: &str) -> IcuFormatter {
        IcuFormatter::new(locale, true, Arc::new(PluralRulesCache::new()))
    }

    const ITEMS: &str = "{count, plural, =0 {no items} one {# item} other {# items}}";

    #[test]
    fn test_plural_with_exact_match() {
        let f = formatter("en");
        assert_eq!(f.interpolate(ITEMS, Some(&vars! { "count" => 0 })), "no items");
        assert_eq!(f.interpolate(ITEMS, Some(&vars! { "count" => 1 })), "1 item");
        assert_eq!(f.interpolate(ITEMS, Some(&vars! { "count" => 5 })), "5 items");
    }

    #[test]
    fn test_plural_uses_locale_categories() {
        let f = formatter("pl");
        let template = "{n, plural, one {# plik} few {# pliki} many {# plików} other {# pliku}}";
        assert_eq!(f.interpolate(template, Some(&vars! { "n" => 3 })), "3 pliki");
        assert_eq!(f.interpolate(template, Some(&vars! { "n" => 5 })), "5 plików");

        f.set_locale("en");
        assert_eq!(f.locale(), "en");
        assert_eq!(f.interpolate(template, Some(&vars! { "n" => 5 })), "5 pliku");
    }

    #[test]
    fn test_select() {
        let f = formatter("en");
        let template = "{gender, select, male {He} female {She} other {They}} liked this";
        assert_eq!(f.interpolate(template, Some(&vars! { "gender" => "male" })), "He liked this");
        assert_eq!(f.interpolate(template, Some(&vars! { "gender" => "female" })), "She liked this");
        assert_eq!(f.interpolate(template, Some(&vars! { "gender" => "x" })), "They liked this");
    }

    #[test]
    fn test_select_without_match_or_other_yields_value() {
        let f = formatter("en");
        let template = "{kind, select, a {Alpha}}";
        assert_eq!(f.interpolate(template, Some(&vars! { "kind" => "zeta" })), "zeta");
    }

    #[test]
    fn test_selectordinal() {
        let f = formatter("en");
        let template = "You finished {place, selectordinal, one {#st} two {#nd} few {#rd} other {#th}}";
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (23, "23rd"),
        ];
        for (place, suffix) in cases {
            assert_eq!(
                f.interpolate(template, Some(&vars! { "place" => place })),
                format!("You finished {suffix}")
            );
        }
    }

    #[test]
    fn test_nested_plural_inside_select() {
        let f = formatter("en");
        let template = "{gender, select, male {He has {count, plural, one {# item} other {# items}}} \
                        female {She has {count, plural, one {# item} other {# items}}} \
                        other {They have {count, plural, one {# item} other {# items}}}}";
        let render = |gender: &str, count: i64| {
            f.interpolate(template, Some(&vars! { "gender" => gender, "count" => count }))
        };
        assert_eq!(render("male", 1), "He has 1 item");
        assert_eq!(render("male", 5), "He has 5 items");
        assert_eq!(render("female", 3), "She has 3 items");
        assert_eq!(render("nobody", 1), "They have 1 item");
    }

    #[test]
    fn test_deeply_nested_select() {
        let f = formatter("en");
        let template = "{a, select, x {{b, select, y {{c, plural, one {one #} other {many #}}} other {B}}} other {A}}";
        let vars = vars! { "a" => "x", "b" => "y", "c" => 2 };
        assert_eq!(f.interpolate(template, Some(&vars)), "many 2");
    }

    #[test]
    fn test_simple_variables_and_mixed_patterns() {
        let f = formatter("en");
        let template = "{name}, you have {count, plural, =0 {no items} one {# item} other {# items}} in your cart";
        assert_eq!(
            f.interpolate(template, Some(&vars! { "name" => "Bob", "count" => 5 })),
            "Bob, you have 5 items in your cart"
        );
        assert_eq!(
            f.interpolate("Uploading... {percent}% complete", Some(&vars! { "percent" => 75 })),
            "Uploading... 75% complete"
        );
    }

    #[test]
    fn test_missing_variables_leave_patterns() {
        let f = formatter("en");
        assert_eq!(f.interpolate("Hello {name}", Some(&vars! {})), "Hello {name}");
        assert_eq!(f.interpolate(ITEMS, Some(&vars! { "count" => "five" })), ITEMS);
        assert_eq!(f.interpolate(ITEMS, None), ITEMS);
    }

    #[test]
    fn test_unbalanced_pattern_is_kept_verbatim() {
        let f = formatter("en");
        let template = "{count, plural, one {# item} other {# items}";
        assert_eq!(f.interpolate(template, Some(&vars! { "count" => 1 })), template);
    }

    #[test]
    fn test_plural_without_matching_clause_yields_number() {
        let f = formatter("en");
        assert_eq!(
            f.interpolate("{count, plural, one {single}}", Some(&vars! { "count" => 7 })),
            "7"
        );
    }

    #[test]
    fn test_variables_are_escaped() {
        let f = formatter("en");
        assert_eq!(
            f.interpolate("Hi {name}", Some(&vars! { "name" => "<script>" })),
            "Hi &lt;script&gt;"
        );

        let raw = IcuFormatter::new("en", false, Arc::new(PluralRulesCache::new()));
        assert_eq!(raw.interpolate("Hi {name}", Some(&vars! { "name" => "<b>" })), "Hi <b>");
    }

    #[test]
    fn test_select_fallback_value_is_not_reparsed() {
        let f = formatter("en");
        let template = "Hi {who, select, admin {boss}}";
        let pattern_like = "{who, select, admin {boss}}";
        assert_eq!(
            f.interpolate(template, Some(&vars! { "who" => pattern_like })),
            "Hi {who, select, admin {boss}}"
        );

        let nested = "{kind, select, a {Alpha}} and {count, plural, one {# item} other {# items}}";
        assert_eq!(
            f.interpolate(nested, Some(&vars! { "kind" => "{count}", "count" => 2 })),
            "{count} and 2 items"
        );
    }

    #[test]
    fn test_select_fallback_value_is_escaped() {
        let f = formatter("en");
        let vars = vars! { "kind" => "<script>" };
        assert_eq!(f.interpolate("{kind, select, a {Alpha}}", Some(&vars)), "&lt;script&gt;");
        assert_eq!(f.interpolate("{kind}", Some(&vars)), "&lt;script&gt;");

        let raw = IcuFormatter::new("en", false, Arc::new(PluralRulesCache::new()));
        assert_eq!(raw.interpolate("{kind, select, a {Alpha}}", Some(&vars)), "<script>");
    }

    #[test]
    fn test_find_matching_brace() {
        assert_eq!(find_matching_brace("{a {b} c}", 0), Some(8));
        assert_eq!(find_matching_brace("{a {b}", 0), None);
        assert_eq!(find_matching_brace("x{}", 1), Some(2));
    }

    #[test]
    fn test_parse_clauses() {
        let clauses = parse_clauses(" =0 {none} one {# {nested}} other{#}");
        assert_eq!(
            clauses,
            vec![
                Clause { selector: "=0", body: "none" },
                Clause { selector: "one", body: "# {nested}" },
                Clause { selector: "other", body: "#" },
            ]
        );
        assert!(parse_clauses("broken").is_empty());
    }
}
