//! Ordinal categories for `selectordinal`.

use super::{PluralCategory, PluralRulesCache};

/// Ordinal category of `count` in `locale`.
///
/// English follows the `1st 2nd 3rd 4th 11th 12th 13th 21st` pattern.
/// Other locales use their cardinal rules.
pub fn ordinal_category(count: f64, locale: &str, rules: &PluralRulesCache) -> PluralCategory {
    if !is_english(locale) {
        return rules.category(count, locale);
    }

    let n = count.abs();
    if n.fract() != 0.0 {
        return PluralCategory::Other;
    }
    let (mod10, mod100) = (n % 10.0, n % 100.0);
    if mod10 == 1.0 && mod100 != 11.0 {
        PluralCategory::One
    } else if mod10 == 2.0 && mod100 != 12.0 {
        PluralCategory::Two
    } else if mod10 == 3.0 && mod100 != 13.0 {
        PluralCategory::Few
    } else {
        PluralCategory::Other
    }
}

fn is_english(locale: &str) -> bool {
    let language = locale.split(['-', '_']).next().unwrap_or_default();
    language.eq_ignore_ascii_case("en")
}
