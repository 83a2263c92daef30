//! # Bakery Core
//!
//! Translation resolution and formatting engine.
//!
//! The crate turns `t("home:hero.title", vars)` calls into rendered strings:
//! keys are split into namespace and key, plugins get a chance to rewrite
//! the call, plurals are resolved, the store is searched in the current and
//! fallback locales, and the template is rendered with either the mustache
//! or the ICU formatter. Misses fall back to visible defaults and trigger
//! deduplicated background loads and saves.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod format;
pub mod key;
pub mod path_key;
pub mod plugin;
pub mod plural;
pub mod service;
pub mod store;

pub use backend::{Loader, Saver};
pub use error::{I18nError, I18nResult};
pub use format::{build_formatter, Formatter, IcuFormatter, MustacheFormatter};
pub use key::{KeyParts, RuntimeKeyParser};
pub use path_key::{ParsedKey, PathKeyParser};
pub use plugin::{
    ContextPatch, Hook, Plugin, PluginConfig, PluginContext, PluginKind, PluginManager,
    PluginMetadata,
};
pub use plural::{
    CldrPluralResolver, PluralCategory, PluralResolution, PluralResolver, PluralRulesCache,
    ResolvedCategory, SuffixPluralResolver,
};
pub use service::{I18nConfig, Subscription, TranslateArgs, TranslationService};
pub use store::{MemoryStore, NamespaceMap, Store, TranslationMap, TranslationValue};
