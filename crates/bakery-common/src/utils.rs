//! Shared helpers for reading and displaying interpolation values.

use crate::types::Vars;
use serde_json::Value;

/// Converts anything `serde_json` knows how to represent into a [`Value`].
pub fn to_value<V: Into<Value>>(value: V) -> Value {
    value.into()
}

/// Escapes HTML-significant characters (`& < > " ' /`).
pub fn escape_html(input: &str) -> String {
    v_htmlescape::escape(input).to_string()
}

/// Formats a number the way it should appear inside translated text.
///
/// Whole numbers drop the fractional part, so `5.0` renders as `"5"`.
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Renders a variable for substitution. `null` has no display form.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.as_f64().map_or_else(|| n.to_string(), format_number)),
        other => Some(other.to_string()),
    }
}

/// Returns the numeric value of a variable, if it is a JSON number.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Walks a dotted path (`user.details.name`) into a variable bag.
///
/// Returns `None` when any segment is missing, when an intermediate value
/// is not an object, or when the final value is `null`.
pub fn lookup_path<'a>(vars: &'a Vars, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = vars.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}
