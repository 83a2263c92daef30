//! `{{path}}` interpolation.

use super::{render_value, Formatter};
use bakery_common::{display_value, lookup_path, Vars};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("Invalid placeholder regex pattern"));

/// Replaces `{{path}}` tokens with values from the variable bag.
///
/// Paths may be dotted (`{{user.name}}`). A token whose value is missing or
/// `null` is left in place so the gap stays visible.
#[derive(Debug, Clone)]
pub struct MustacheFormatter {
    escape_html: bool,
}

impl MustacheFormatter {
    /// Creates a formatter; `escape_html` controls value escaping.
    pub fn new(escape_html: bool) -> Self {
        Self { escape_html }
    }
}

impl Default for MustacheFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Formatter for MustacheFormatter {
    fn interpolate(&self, template: &str, vars: Option<&Vars>) -> String {
        let Some(vars) = vars else {
            return template.to_string();
        };

        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| {
                lookup_path(vars, caps[1].trim())
                    .and_then(display_value)
                    .map(|text| render_value(text, self.escape_html))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakery_common::vars;
    use serde_json::json;

    #[test]
    fn test_simple_and_nested_paths() {
        let formatter = MustacheFormatter::default();
        let vars = vars! {
            "name" => "John",
            "user" => json!({ "details": { "city": "Lisbon" } }),
        };
        assert_eq!(
            formatter.interpolate("Hello {{name}} from {{ user.details.city }}", Some(&vars)),
            "Hello John from Lisbon"
        );
    }

    #[test]
    fn test_missing_and_null_values_keep_token() {
        let formatter = MustacheFormatter::default();
        let vars = vars! { "empty" => serde_json::Value::Null };
        assert_eq!(
            formatter.interpolate("{{missing}} / {{empty}} / {{user.name}}", Some(&vars)),
            "{{missing}} / {{empty}} / {{user.name}}"
        );
    }

    #[test]
    fn test_no_vars_returns_template() {
        let formatter = MustacheFormatter::default();
        assert_eq!(formatter.interpolate("Hi {{name}}", None), "Hi {{name}}");
    }

    #[test]
    fn test_numbers_and_booleans() {
        let formatter = MustacheFormatter::default();
        let vars = vars! { "count" => 5, "ratio" => 0.5, "ok" => true };
        assert_eq!(
            formatter.interpolate("{{count}} {{ratio}} {{ok}}", Some(&vars)),
            "5 0.5 true"
        );
    }

    #[test]
    fn test_escaping_policy() {
        let vars = vars! { "name" => "<b>Tom & Jerry" };

        let escaping = MustacheFormatter::new(true);
        assert_eq!(
            escaping.interpolate("<i>{{name}}</i>", Some(&vars)),
            "<i>&lt;b&gt;Tom &amp; Jerry</i>"
        );

        let raw = MustacheFormatter::new(false);
        assert_eq!(raw.interpolate("{{name}}", Some(&vars)), "<b>Tom & Jerry");
    }
}
