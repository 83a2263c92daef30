//! i18next-style suffix strategy.

use super::{exact_count_key, PluralCategory, PluralResolution, PluralResolver, ResolvedCategory};

/// Resolves `key_<count>` → `key` (count 1) → `key<suffix>`.
///
/// With keys `apple`, `apple_plural` and `apple_0`:
/// `0 → apple_0`, `1 → apple`, `5 → apple_plural`.
#[derive(Debug, Clone)]
pub struct SuffixPluralResolver {
    plural_suffix: String,
}

impl SuffixPluralResolver {
    /// Creates a resolver using `plural_suffix` for plural keys.
    pub fn new(plural_suffix: impl Into<String>) -> Self {
        Self {
            plural_suffix: plural_suffix.into(),
        }
    }

    /// Suffix appended for plural counts.
    pub fn plural_suffix(&self) -> &str {
        &self.plural_suffix
    }

    fn count_category(count: f64) -> PluralCategory {
        if count == 0.0 {
            PluralCategory::Zero
        } else if (count - 1.0).abs() < f64::EPSILON {
            PluralCategory::One
        } else if (count - 2.0).abs() < f64::EPSILON {
            PluralCategory::Two
        } else {
            PluralCategory::Other
        }
    }
}

impl Default for SuffixPluralResolver {
    fn default() -> Self {
        Self::new(bakery_config::defaults::DEFAULT_PLURAL_SUFFIX)
    }
}

impl PluralResolver for SuffixPluralResolver {
    fn resolve(&self, key: &str, count: f64, _locale: &str) -> PluralResolution {
        if (count - 1.0).abs() < f64::EPSILON {
            PluralResolution {
                key: key.to_string(),
                category: Some(ResolvedCategory::Singular),
                exact_match: false,
            }
        } else {
            PluralResolution {
                key: format!("{key}{}", self.plural_suffix),
                category: Some(ResolvedCategory::Plural),
                exact_match: false,
            }
        }
    }

    fn resolve_checked(
        &self,
        key: &str,
        count: f64,
        locale: &str,
        exists: &dyn Fn(&str) -> bool,
    ) -> PluralResolution {
        let exact = exact_count_key(key, count);
        if exists(&exact) {
            return PluralResolution {
                key: exact,
                category: Some(ResolvedCategory::Cldr(Self::count_category(count))),
                exact_match: true,
            };
        }
        self.resolve(key, count, locale)
    }

    fn category(&self, count: f64, _locale: &str) -> PluralCategory {
        Self::count_category(count)
    }
}
