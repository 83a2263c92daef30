//! Translation service
//!
//! [`TranslationService`] ties the engine together. `t()` is synchronous
//! and never fails: it parses the key, runs plugin hooks, resolves plurals,
//! looks the key up in the current and fallback locales and renders the
//! template. A miss renders the default text (or the raw key) and kicks off
//! background work on the ambient tokio runtime:
//!
//! * the placeholder is written to the store so the next call hits
//! * with `save_missing`, the [`Saver`] is called once per
//!   `(locale, namespace, key)` while a save is in flight
//! * the [`Loader`] is asked for the namespace once per
//!   `(locale, namespace)` until a load succeeds
//!
//! ```no_run
//! use bakery_config::I18nSettings;
//! use bakery_core::{I18nConfig, TranslationService};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = TranslationService::new(I18nConfig::new(I18nSettings::for_locale("en")))?;
//! assert_eq!(service.t("home.title", "Welcome"), "Welcome");
//! # Ok(())
//! # }
//! ```

use crate::backend::{Loader, Saver};
use crate::error::I18nResult;
use crate::format::{build_formatter, Formatter};
use crate::key::RuntimeKeyParser;
use crate::plugin::{Hook, Plugin, PluginConfig, PluginContext, PluginManager};
use crate::plural::{build_resolver, exact_count_key, PluralResolver, PluralRulesCache};
use crate::store::{MemoryStore, NamespaceMap, Store, TranslationMap};
use arc_swap::ArcSwap;
use bakery_common::{numeric_value, Vars};
use bakery_config::I18nSettings;
use dashmap::DashSet;
use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

/// Logs engine trigger messages at `debug` in debug mode and `trace`
/// otherwise.
macro_rules! trigger {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            tracing::debug!($($arg)+)
        } else {
            tracing::trace!($($arg)+)
        }
    };
}

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Optional arguments of [`TranslationService::t`].
///
/// Usually built through `From`: `()`, a default text, a [`Vars`] bag, or a
/// `(default, vars)` pair. A `defaultValue` string inside the vars also
/// counts as the default text. Empty default text counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TranslateArgs {
    /// No default and no variables.
    #[default]
    None,
    /// Default text only.
    Default(String),
    /// Variables only.
    Vars(Vars),
    /// Default text and variables.
    DefaultAndVars(String, Vars),
}

impl TranslateArgs {
    fn into_parts(self) -> (Option<String>, Option<Vars>) {
        let (default_text, vars) = match self {
            Self::None => (None, None),
            Self::Default(text) => (Some(text), None),
            Self::Vars(vars) => (None, Some(vars)),
            Self::DefaultAndVars(text, vars) => (Some(text), Some(vars)),
        };

        let default_text = default_text.filter(|text| !text.is_empty()).or_else(|| {
            vars.as_ref()?
                .get("defaultValue")?
                .as_str()
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        });
        (default_text, vars)
    }
}

impl From<()> for TranslateArgs {
    fn from((): ()) -> Self {
        Self::None
    }
}

impl From<&str> for TranslateArgs {
    fn from(text: &str) -> Self {
        Self::Default(text.to_string())
    }
}

impl From<String> for TranslateArgs {
    fn from(text: String) -> Self {
        Self::Default(text)
    }
}

impl From<Vars> for TranslateArgs {
    fn from(vars: Vars) -> Self {
        Self::Vars(vars)
    }
}

impl From<(&str, Vars)> for TranslateArgs {
    fn from((text, vars): (&str, Vars)) -> Self {
        Self::DefaultAndVars(text.to_string(), vars)
    }
}

impl From<(String, Vars)> for TranslateArgs {
    fn from((text, vars): (String, Vars)) -> Self {
        Self::DefaultAndVars(text, vars)
    }
}

/// Settings plus the collaborators that cannot be deserialized.
pub struct I18nConfig {
    settings: I18nSettings,
    plugins: Vec<(Arc<dyn Plugin>, Option<PluginConfig>)>,
    loader: Option<Arc<dyn Loader>>,
    saver: Option<Arc<dyn Saver>>,
    store: Option<Box<dyn Store>>,
}

impl I18nConfig {
    /// Configuration with no plugins, loader or saver.
    pub fn new(settings: I18nSettings) -> Self {
        Self {
            settings,
            plugins: Vec::new(),
            loader: None,
            saver: None,
            store: None,
        }
    }

    /// Registers `plugin` with its default configuration.
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push((plugin, None));
        self
    }

    /// Registers `plugin` with an explicit configuration.
    pub fn with_plugin_config(mut self, plugin: Arc<dyn Plugin>, config: PluginConfig) -> Self {
        self.plugins.push((plugin, Some(config)));
        self
    }

    /// Sets the namespace loader.
    pub fn with_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Sets the missing-key saver.
    pub fn with_saver(mut self, saver: Arc<dyn Saver>) -> Self {
        self.saver = Some(saver);
        self
    }

    /// Replaces the default [`MemoryStore`].
    pub fn with_store(mut self, store: Box<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// The engine settings.
    pub fn settings(&self) -> &I18nSettings {
        &self.settings
    }
}

impl From<I18nSettings> for I18nConfig {
    fn from(settings: I18nSettings) -> Self {
        Self::new(settings)
    }
}

impl fmt::Debug for I18nConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18nConfig")
            .field("settings", &self.settings)
            .field("plugins", &self.plugins.len())
            .field("loader", &self.loader.is_some())
            .field("saver", &self.saver.is_some())
            .finish_non_exhaustive()
    }
}

struct Inner {
    store: RwLock<Box<dyn Store>>,
    locale: ArcSwap<String>,
    fallback_locale: Option<String>,
    parser: RuntimeKeyParser,
    formatter: Box<dyn Formatter>,
    resolver: Box<dyn PluralResolver>,
    plugins: PluginManager,
    loader: Option<Arc<dyn Loader>>,
    saver: Option<Arc<dyn Saver>>,
    save_missing: bool,
    debug: bool,
    loaded: DashSet<(String, String)>,
    pending_loads: DashSet<(String, String)>,
    pending_saves: DashSet<(String, String, String)>,
    listeners: RwLock<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    tasks: TaskTracker,
}

impl Inner {
    /// Current locale followed by the fallback locale, without duplicates.
    fn locale_chain<'a>(&'a self, locale: &'a str) -> Vec<&'a str> {
        let mut chain = vec![locale];
        if let Some(fallback) = self.fallback_locale.as_deref() {
            if fallback != locale {
                chain.push(fallback);
            }
        }
        chain
    }

    fn lookup(&self, locales: &[&str], namespace: &str, key: &str) -> Option<String> {
        let store = self.store.read();
        locales
            .iter()
            .find_map(|locale| store.get(locale, namespace, key).map(str::to_string))
    }

    /// Exact-count key, then the resolver's plural key, then the base key.
    fn find_template(
        &self,
        locales: &[&str],
        namespace: &str,
        key: &str,
        count: Option<f64>,
    ) -> Option<String> {
        if let Some(count) = count {
            if let Some(template) = self.lookup(locales, namespace, &exact_count_key(key, count)) {
                return Some(template);
            }

            let resolution = {
                let store = self.store.read();
                let exists = |candidate: &str| {
                    locales
                        .iter()
                        .any(|locale| store.has(locale, namespace, candidate))
                };
                self.resolver
                    .resolve_checked(key, count, locales[0], &exists)
            };
            trigger!(
                self.debug,
                key,
                count,
                resolved = %resolution.key,
                category = resolution.category.map(|c| c.as_str()),
                "Resolved plural key"
            );
            if let Some(template) = self.lookup(locales, namespace, &resolution.key) {
                return Some(template);
            }
        }

        self.lookup(locales, namespace, key)
    }

    fn add_translations(&self, locale: &str, namespace: &str, translations: TranslationMap) {
        self.store
            .write()
            .set_namespace(locale, namespace, translations);
        self.loaded.insert((locale.to_string(), namespace.to_string()));
        self.notify();
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn spawn_background<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                self.tasks.spawn_on(task, &handle);
                true
            }
            Err(_) => {
                warn!("No tokio runtime available, skipping background load/save");
                false
            }
        }
    }
}

/// The translation engine.
///
/// Cheap to clone; clones share state. Background loads and saves run on
/// the tokio runtime that is current when `t()` misses.
#[derive(Clone)]
pub struct TranslationService {
    inner: Arc<Inner>,
}

impl fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationService")
            .field("locale", &self.locale())
            .field("fallback_locale", &self.inner.fallback_locale)
            .field("plugins", &self.inner.plugins)
            .finish_non_exhaustive()
    }
}

impl TranslationService {
    /// Validates the settings, builds the engine and registers plugins in
    /// order.
    ///
    /// # Errors
    ///
    /// * [`crate::I18nError::Config`] for invalid settings
    /// * any plugin registration error from [`PluginManager::register`]
    pub fn new(config: I18nConfig) -> I18nResult<Self> {
        let I18nConfig {
            settings,
            plugins,
            loader,
            saver,
            store,
        } = config;
        settings.validate()?;

        let rules = Arc::new(PluralRulesCache::new());
        let formatter = build_formatter(
            settings.message_format,
            &settings.locale,
            settings.escape_html,
            Arc::clone(&rules),
        );
        let resolver = build_resolver(&settings.pluralization, rules);

        let manager = PluginManager::new();
        for (plugin, plugin_config) in plugins {
            manager.register(plugin, plugin_config)?;
        }

        info!(
            locale = %settings.locale,
            fallback = ?settings.fallback_locale,
            format = %settings.message_format,
            pluralization = %settings.pluralization.strategy,
            plugins = manager.len(),
            "Translation service initialized"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                store: RwLock::new(store.unwrap_or_else(|| Box::new(MemoryStore::new()))),
                locale: ArcSwap::from_pointee(settings.locale),
                fallback_locale: settings.fallback_locale,
                parser: RuntimeKeyParser::new(settings.default_namespace),
                formatter,
                resolver,
                plugins: manager,
                loader,
                saver,
                save_missing: settings.save_missing,
                debug: settings.debug,
                loaded: DashSet::new(),
                pending_loads: DashSet::new(),
                pending_saves: DashSet::new(),
                listeners: RwLock::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                tasks: TaskTracker::new(),
            }),
        })
    }

    /// Translates `key`.
    ///
    /// `args` is anything convertible into [`TranslateArgs`]: `()`, a
    /// default text, a [`Vars`] bag or a `(default, vars)` pair. A numeric
    /// `count` variable selects a plural form.
    ///
    /// Never fails. A key found in neither locale renders the default text,
    /// or the key exactly as passed in.
    pub fn t(&self, key: &str, args: impl Into<TranslateArgs>) -> String {
        let (default_text, vars) = args.into().into_parts();
        let locale = self.locale();
        let parts = self.inner.parser.parse(key, &locale);

        let mut context = PluginContext {
            locale,
            namespace: Some(parts.namespace),
            key: Some(parts.key),
            vars,
            result: None,
            data: Vars::new(),
        };
        self.inner
            .plugins
            .execute_hook(Hook::BeforeTranslate, &mut context);

        let locale = context.locale.clone();
        let namespace = context.namespace.clone().unwrap_or_default();
        let lookup_key = context.key.clone().unwrap_or_default();
        let count = context
            .vars
            .as_ref()
            .and_then(|vars| vars.get("count"))
            .and_then(numeric_value);

        let found = {
            let locales = self.inner.locale_chain(&locale);
            self.inner
                .find_template(&locales, &namespace, &lookup_key, count)
        };
        let template = match found {
            Some(template) => template,
            None => {
                let template = default_text.clone().unwrap_or_else(|| key.to_string());
                let placeholder = default_text.unwrap_or_else(|| lookup_key.clone());
                context.result = Some(template.clone());
                self.handle_missing(&locale, &namespace, &lookup_key, placeholder, &mut context);
                template
            }
        };

        let rendered = self
            .inner
            .formatter
            .interpolate(&template, context.vars.as_ref());
        context.result = Some(rendered);
        self.inner
            .plugins
            .execute_hook(Hook::AfterTranslate, &mut context);
        context.result.unwrap_or_default()
    }

    fn handle_missing(
        &self,
        locale: &str,
        namespace: &str,
        key: &str,
        placeholder: String,
        context: &mut PluginContext,
    ) {
        trigger!(self.inner.debug, locale, namespace, key, "Translation missing");
        self.inner.plugins.execute_hook(Hook::Missing, context);

        if key.is_empty() {
            return;
        }

        self.inner
            .store
            .write()
            .set(locale, namespace, key, placeholder.clone());

        if self.inner.save_missing {
            self.save_missing(locale, namespace, key, placeholder);
        }
        self.ensure_loaded(locale, namespace);
    }

    fn save_missing(&self, locale: &str, namespace: &str, key: &str, value: String) {
        let Some(saver) = self.inner.saver.clone() else {
            return;
        };
        let entry = (locale.to_string(), namespace.to_string(), key.to_string());
        if !self.inner.pending_saves.insert(entry.clone()) {
            return;
        }

        trigger!(self.inner.debug, locale, namespace, key, "Saving missing key");
        let inner = Arc::clone(&self.inner);
        let task_entry = entry.clone();
        let spawned = self.inner.spawn_background(async move {
            let (locale, namespace, key) = &task_entry;
            if let Err(e) = saver.save(locale, namespace, key, &value).await {
                error!(%locale, %namespace, %key, error = %e, "Failed to save missing key");
            }
            inner.pending_saves.remove(&task_entry);
        });
        if !spawned {
            self.inner.pending_saves.remove(&entry);
        }
    }

    fn ensure_loaded(&self, locale: &str, namespace: &str) {
        let Some(loader) = self.inner.loader.clone() else {
            return;
        };
        let entry = (locale.to_string(), namespace.to_string());
        if self.inner.loaded.contains(&entry) || !self.inner.pending_loads.insert(entry.clone()) {
            return;
        }
        // A load may have finished between the two checks above.
        if self.inner.loaded.contains(&entry) {
            self.inner.pending_loads.remove(&entry);
            return;
        }

        trigger!(self.inner.debug, locale, namespace, "Triggering namespace load");
        let inner = Arc::clone(&self.inner);
        let task_entry = entry.clone();
        let spawned = self.inner.spawn_background(async move {
            let (locale, namespace) = &task_entry;
            match loader.load(locale, namespace).await {
                Ok(Some(translations)) => {
                    inner.add_translations(locale, namespace, translations.clone());
                    let mut context = PluginContext::for_locale(locale.clone());
                    context.namespace = Some(namespace.clone());
                    inner.plugins.execute_hook(
                        Hook::Load {
                            locale,
                            namespace,
                            data: &translations,
                        },
                        &mut context,
                    );
                    info!(%locale, %namespace, entries = translations.len(), "Loaded namespace");
                }
                Ok(None) => {
                    trigger!(inner.debug, %locale, %namespace, "Namespace not available");
                }
                Err(e) => {
                    error!(%locale, %namespace, error = %e, "Failed to load namespace");
                }
            }
            inner.pending_loads.remove(&task_entry);
        });
        if !spawned {
            self.inner.pending_loads.remove(&entry);
        }
    }

    /// The active locale.
    pub fn locale(&self) -> String {
        String::clone(&self.inner.locale.load())
    }

    /// The fallback locale, if configured.
    pub fn fallback_locale(&self) -> Option<&str> {
        self.inner.fallback_locale.as_deref()
    }

    /// Switches the active locale, runs `on_locale_change` and notifies
    /// subscribers.
    ///
    /// The locale is not validated; see [`I18nSettings::locale`].
    pub fn set_locale(&self, locale: impl Into<String>) {
        let new = locale.into();
        let old = self.inner.locale.swap(Arc::new(new.clone()));
        self.inner.formatter.set_locale(&new);
        info!(old = %old, new = %new, "Locale changed");

        let mut context = PluginContext::for_locale(new.clone());
        self.inner.plugins.execute_hook(
            Hook::LocaleChange {
                old: &old,
                new: &new,
            },
            &mut context,
        );
        self.inner.notify();
    }

    /// Replaces `namespace` for `locale`, marks it loaded and notifies
    /// subscribers.
    pub fn add_translations(
        &self,
        locale: &str,
        namespace: &str,
        translations: impl Into<TranslationMap>,
    ) {
        self.inner
            .add_translations(locale, namespace, translations.into());
    }

    /// Every namespace stored for `locale`.
    pub fn translations(&self, locale: &str) -> Option<NamespaceMap> {
        self.inner.store.read().get_all(locale).cloned()
    }

    /// Whether `key` resolves in the current or fallback locale.
    pub fn exists(&self, key: &str) -> bool {
        let locale = self.locale();
        let parts = self.inner.parser.parse(key, &locale);
        let locales = self.inner.locale_chain(&locale);
        self.inner
            .lookup(&locales, &parts.namespace, &parts.key)
            .is_some()
    }

    /// Whether a namespace has been added or loaded for `locale`.
    pub fn is_loaded(&self, locale: &str, namespace: &str) -> bool {
        self.inner
            .loaded
            .contains(&(locale.to_string(), namespace.to_string()))
    }

    /// The plugin registry.
    pub fn plugins(&self) -> &PluginManager {
        &self.inner.plugins
    }

    /// Calls `listener` after every `add_translations` and `set_locale`.
    ///
    /// Listeners run on the thread that caused the change, with no engine
    /// lock held.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().push((id, Arc::new(listener)));
        Subscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Waits for every background load and save started so far, including
    /// tasks started while waiting.
    pub async fn wait_idle(&self) {
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
        self.inner.tasks.reopen();
    }
}

/// Handle returned by [`TranslationService::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    inner: Weak<Inner>,
    id: u64,
}

impl Subscription {
    /// Removes the listener. Does nothing if the service is gone.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.write().retain(|(id, _)| *id != self.id);
        }
    }
}
