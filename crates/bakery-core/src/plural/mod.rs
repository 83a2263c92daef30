//! Pluralization strategies
//!
//! A [`PluralResolver`] turns a base key and a count into the concrete key
//! to look up. Two strategies exist: [`SuffixPluralResolver`]
//! (`key`, `key_plural`, `key_0`) and [`CldrPluralResolver`] (`key_one`,
//! `key_few`, ...). CLDR rule data is shared through [`PluralRulesCache`].

mod cldr;
mod ordinal;
mod suffix;

pub use cldr::{CldrPluralResolver, LocalePluralInfo, PluralRulesCache};
pub use ordinal::ordinal_category;
pub use suffix::SuffixPluralResolver;

use bakery_common::format_number;
use bakery_config::{PluralizationSettings, PluralizationStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// CLDR plural categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralCategory {
    /// `0` in Arabic, Welsh, Latvian.
    Zero,
    /// Singular.
    One,
    /// Dual.
    Two,
    /// Paucal (Polish 2-4, Arabic 3-10).
    Few,
    /// Polish 5+, Arabic 11-99.
    Many,
    /// Everything else; always present.
    Other,
}

impl PluralCategory {
    /// Every category in CLDR order.
    pub const ALL: [Self; 6] = [
        Self::Zero,
        Self::One,
        Self::Two,
        Self::Few,
        Self::Many,
        Self::Other,
    ];

    /// The CLDR keyword (`"one"`, `"few"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category reported by a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedCategory {
    /// A CLDR category.
    Cldr(PluralCategory),
    /// Suffix strategy, `count == 1`.
    Singular,
    /// Suffix strategy, any other count.
    Plural,
}

impl ResolvedCategory {
    /// Keyword for logs and key building.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cldr(category) => category.as_str(),
            Self::Singular => "singular",
            Self::Plural => "plural",
        }
    }
}

/// Result of resolving a plural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralResolution {
    /// Concrete key to look up.
    pub key: String,
    /// Category that selected the key.
    pub category: Option<ResolvedCategory>,
    /// Whether an exact-count key (`key_<count>`) was chosen.
    pub exact_match: bool,
}

/// Maps `(key, count, locale)` to the concrete key to look up.
pub trait PluralResolver: Send + Sync {
    /// Resolves without knowing which keys exist.
    fn resolve(&self, key: &str, count: f64, locale: &str) -> PluralResolution;

    /// Resolves with an existence check for candidate keys.
    ///
    /// Strategies that prefer existing exact-count keys override this.
    fn resolve_checked(
        &self,
        key: &str,
        count: f64,
        locale: &str,
        _exists: &dyn Fn(&str) -> bool,
    ) -> PluralResolution {
        self.resolve(key, count, locale)
    }

    /// Plural category for `count` in `locale`.
    fn category(&self, count: f64, locale: &str) -> PluralCategory;
}

/// `key_<count>`, e.g. `apple_0`.
pub fn exact_count_key(key: &str, count: f64) -> String {
    format!("{key}_{}", format_number(count))
}

/// Builds the resolver selected by the settings.
pub fn build_resolver(
    settings: &PluralizationSettings,
    rules: Arc<PluralRulesCache>,
) -> Box<dyn PluralResolver> {
    match settings.strategy {
        PluralizationStrategy::Suffix => {
            Box::new(SuffixPluralResolver::new(settings.plural_suffix.clone()))
        }
        PluralizationStrategy::Cldr => Box::new(CldrPluralResolver::new(rules)),
    }
}
