//! CLDR plural rules backed by `intl_pluralrules`.

use super::{PluralCategory, PluralResolution, PluralResolver, ResolvedCategory};
use intl_pluralrules::{PluralCategory as IntlCategory, PluralRuleType, PluralRules};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

const FALLBACK_RULES_LOCALE: &str = "en";

/// Per-locale cache of cardinal plural rules.
///
/// Rule tables are looked up once per locale tag. Tags with a region fall
/// back to their language (`pt-BR` → `pt`); unknown languages use English
/// rules.
#[derive(Default)]
pub struct PluralRulesCache {
    rules: RwLock<HashMap<String, Arc<PluralRules>>>,
}

impl std::fmt::Debug for PluralRulesCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluralRulesCache")
            .field("locales", &self.rules.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluralRulesCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cardinal category of `count` in `locale`. The sign is ignored.
    pub fn category(&self, count: f64, locale: &str) -> PluralCategory {
        let Some(rules) = self.rules_for(locale) else {
            return PluralCategory::Other;
        };
        match rules.select(count.abs()) {
            Ok(category) => from_intl(category),
            Err(reason) => {
                debug!(count, locale, reason, "Count has no plural operands, using 'other'");
                PluralCategory::Other
            }
        }
    }

    fn rules_for(&self, locale: &str) -> Option<Arc<PluralRules>> {
        if let Some(rules) = self.rules.read().get(locale) {
            return Some(Arc::clone(rules));
        }

        let rules = Arc::new(create_rules(locale)?);
        Some(
            self.rules
                .write()
                .entry(locale.to_string())
                .or_insert(rules)
                .clone(),
        )
    }
}

fn create_rules(locale: &str) -> Option<PluralRules> {
    if let Ok(langid) = locale.parse::<LanguageIdentifier>() {
        if let Ok(rules) = PluralRules::create(langid.clone(), PluralRuleType::CARDINAL) {
            return Some(rules);
        }
        let language_only = LanguageIdentifier::from_parts(langid.language, None, None, &[]);
        if let Ok(rules) = PluralRules::create(language_only, PluralRuleType::CARDINAL) {
            return Some(rules);
        }
    }

    warn!(locale, "No plural rules for locale, using '{}' rules", FALLBACK_RULES_LOCALE);
    let english = FALLBACK_RULES_LOCALE.parse::<LanguageIdentifier>().ok()?;
    PluralRules::create(english, PluralRuleType::CARDINAL).ok()
}

fn from_intl(category: IntlCategory) -> PluralCategory {
    match category {
        IntlCategory::ZERO => PluralCategory::Zero,
        IntlCategory::ONE => PluralCategory::One,
        IntlCategory::TWO => PluralCategory::Two,
        IntlCategory::FEW => PluralCategory::Few,
        IntlCategory::MANY => PluralCategory::Many,
        IntlCategory::OTHER => PluralCategory::Other,
    }
}

/// Categories a locale uses, with sample counts for each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalePluralInfo {
    /// Locale the info was computed for.
    pub locale: String,
    /// Categories in CLDR order.
    pub categories: Vec<PluralCategory>,
    /// Up to five integer samples in `0..=100` per category.
    pub examples: BTreeMap<PluralCategory, Vec<u32>>,
}

/// Resolves `key_<category>` using CLDR rules.
///
/// ```
/// use bakery_core::plural::{CldrPluralResolver, PluralResolver, PluralRulesCache};
/// use std::sync::Arc;
///
/// let resolver = CldrPluralResolver::new(Arc::new(PluralRulesCache::new()));
/// assert_eq!(resolver.resolve("apple", 5.0, "pl").key, "apple_many");
/// ```
#[derive(Debug, Clone)]
pub struct CldrPluralResolver {
    rules: Arc<PluralRulesCache>,
}

impl CldrPluralResolver {
    /// Creates a resolver sharing `rules`.
    pub fn new(rules: Arc<PluralRulesCache>) -> Self {
        Self { rules }
    }

    /// Which categories `locale` uses, sampled over integers `0..=100`.
    pub fn locale_info(&self, locale: &str) -> LocalePluralInfo {
        let mut examples: BTreeMap<PluralCategory, Vec<u32>> = BTreeMap::new();
        for n in 0..=100u32 {
            let samples = examples
                .entry(self.rules.category(f64::from(n), locale))
                .or_default();
            if samples.len() < 5 {
                samples.push(n);
            }
        }

        LocalePluralInfo {
            locale: locale.to_string(),
            categories: PluralCategory::ALL
                .into_iter()
                .filter(|category| examples.contains_key(category))
                .collect(),
            examples,
        }
    }
}

impl PluralResolver for CldrPluralResolver {
    fn resolve(&self, key: &str, count: f64, locale: &str) -> PluralResolution {
        let category = self.rules.category(count, locale);
        PluralResolution {
            key: format!("{key}_{category}"),
            category: Some(ResolvedCategory::Cldr(category)),
            exact_match: false,
        }
    }

    fn category(&self, count: f64, locale: &str) -> PluralCategory {
        self.rules.category(count, locale)
    }
}
