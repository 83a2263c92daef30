//! Plugin registry and hook dispatch.

use super::{Hook, Plugin, PluginConfig, PluginContext, PluginKind};
use crate::error::{I18nError, I18nResult};
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info};

struct Registration {
    plugin: Arc<dyn Plugin>,
    config: PluginConfig,
}

impl Registration {
    fn name(&self) -> &str {
        &self.plugin.metadata().name
    }
}

/// Ordered set of registered plugins.
///
/// Hooks run in registration order. The registry lock is never held while
/// plugin code runs, so hooks may call back into the engine.
#[derive(Default)]
pub struct PluginManager {
    registrations: RwLock<Vec<Registration>>,
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .registrations
            .read()
            .iter()
            .map(|registration| registration.name().to_string())
            .collect();
        f.debug_struct("PluginManager").field("plugins", &names).finish()
    }
}

impl PluginManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin and runs its `init` hook.
    ///
    /// Without an explicit `config` the plugin's
    /// [`default_config`](Plugin::default_config) is used.
    ///
    /// # Errors
    ///
    /// * [`I18nError::PluginAlreadyRegistered`] for a duplicate name
    /// * [`I18nError::MissingDependency`] when a dependency is not registered
    /// * [`I18nError::PluginInit`] when `init` fails or panics
    pub fn register(&self, plugin: Arc<dyn Plugin>, config: Option<PluginConfig>) -> I18nResult<()> {
        let metadata = plugin.metadata().clone();
        self.check_registrable(&metadata.name, &metadata.dependencies)?;

        let config = config.unwrap_or_else(|| plugin.default_config());
        let init = panic::catch_unwind(AssertUnwindSafe(|| plugin.init(&config.options)));
        match init {
            Ok(Ok(())) => debug!(plugin = %metadata.name, "Initialized plugin"),
            Ok(Err(source)) => {
                return Err(I18nError::PluginInit {
                    plugin: metadata.name,
                    source,
                })
            }
            Err(_) => {
                return Err(I18nError::PluginInit {
                    plugin: metadata.name,
                    source: anyhow::anyhow!("init panicked"),
                })
            }
        }

        let mut registrations = self.registrations.write();
        if registrations.iter().any(|r| r.name() == metadata.name) {
            return Err(I18nError::PluginAlreadyRegistered(metadata.name));
        }
        registrations.push(Registration { plugin, config });

        info!(
            plugin = %metadata.name,
            version = %metadata.version,
            kind = %metadata.kind,
            "Registered plugin"
        );
        Ok(())
    }

    fn check_registrable(&self, name: &str, dependencies: &[String]) -> I18nResult<()> {
        let registrations = self.registrations.read();
        if registrations.iter().any(|r| r.name() == name) {
            return Err(I18nError::PluginAlreadyRegistered(name.to_string()));
        }
        for dependency in dependencies {
            if !registrations.iter().any(|r| r.name() == dependency) {
                return Err(I18nError::MissingDependency {
                    plugin: name.to_string(),
                    dependency: dependency.clone(),
                });
            }
        }
        Ok(())
    }

    /// Removes a plugin and runs its `destroy` hook.
    ///
    /// Returns `false` when no plugin has that name. Failures in `destroy`
    /// are logged, not returned.
    ///
    /// # Errors
    ///
    /// [`I18nError::PluginInUse`] when another plugin depends on it.
    pub fn unregister(&self, name: &str) -> I18nResult<bool> {
        let removed = {
            let mut registrations = self.registrations.write();
            let Some(index) = registrations.iter().position(|r| r.name() == name) else {
                return Ok(false);
            };
            if let Some(dependent) = registrations
                .iter()
                .find(|r| r.plugin.metadata().dependencies.iter().any(|d| d == name))
            {
                return Err(I18nError::PluginInUse {
                    plugin: name.to_string(),
                    dependent: dependent.name().to_string(),
                });
            }
            registrations.remove(index)
        };

        destroy(&removed);
        info!(plugin = %name, "Unregistered plugin");
        Ok(true)
    }

    /// Plugin registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.registrations
            .read()
            .iter()
            .find(|r| r.name() == name)
            .map(|r| Arc::clone(&r.plugin))
    }

    /// Configuration of the plugin registered under `name`.
    pub fn config(&self, name: &str) -> Option<PluginConfig> {
        self.registrations
            .read()
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.config.clone())
    }

    /// All plugins in registration order.
    pub fn all(&self) -> Vec<Arc<dyn Plugin>> {
        self.registrations
            .read()
            .iter()
            .map(|r| Arc::clone(&r.plugin))
            .collect()
    }

    /// Plugins of one kind, in registration order.
    pub fn by_kind(&self, kind: PluginKind) -> Vec<Arc<dyn Plugin>> {
        self.registrations
            .read()
            .iter()
            .filter(|r| r.plugin.metadata().kind == kind)
            .map(|r| Arc::clone(&r.plugin))
            .collect()
    }

    /// Whether a plugin named `name` is registered.
    pub fn has(&self, name: &str) -> bool {
        self.registrations.read().iter().any(|r| r.name() == name)
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    /// Whether no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    /// Enables or disables a plugin. Returns `false` for unknown names.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut registrations = self.registrations.write();
        match registrations.iter_mut().find(|r| r.name() == name) {
            Some(registration) => {
                registration.config.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Unregisters everything, newest first, so dependents go before their
    /// dependencies.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.registrations.write());
        for registration in removed.iter().rev() {
            destroy(registration);
        }
        debug!(count = removed.len(), "Cleared plugins");
    }

    /// Runs `hook` on every enabled plugin, in registration order.
    ///
    /// A failing or panicking plugin is logged and skipped; the context only
    /// changes through successful hook results.
    pub fn execute_hook(&self, hook: Hook<'_>, context: &mut PluginContext) {
        let enabled: Vec<Arc<dyn Plugin>> = self
            .registrations
            .read()
            .iter()
            .filter(|r| r.config.enabled)
            .map(|r| Arc::clone(&r.plugin))
            .collect();

        for plugin in enabled {
            let name = plugin.metadata().name.as_str();
            match hook {
                Hook::BeforeTranslate => {
                    let patch = contain(name, hook, || plugin.before_translate(context));
                    if let Some(Some(patch)) = patch {
                        context.apply(patch);
                    }
                }
                Hook::AfterTranslate => {
                    let result = contain(name, hook, || plugin.after_translate(context));
                    if let Some(Some(result)) = result {
                        context.result = Some(result);
                    }
                }
                Hook::Missing => {
                    contain(name, hook, || plugin.on_missing(context));
                }
                Hook::Load {
                    locale,
                    namespace,
                    data,
                } => {
                    contain(name, hook, || plugin.on_load(locale, namespace, data));
                }
                Hook::LocaleChange { old, new } => {
                    contain(name, hook, || plugin.on_locale_change(old, new));
                }
            }
        }
    }
}

fn contain<T>(plugin: &str, hook: Hook<'_>, call: impl FnOnce() -> anyhow::Result<T>) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            error!(plugin, hook = hook.name(), error = %e, "Plugin hook failed");
            None
        }
        Err(_) => {
            error!(plugin, hook = hook.name(), "Plugin hook panicked");
            None
        }
    }
}

fn destroy(registration: &Registration) {
    let name = registration.name();
    match panic::catch_unwind(AssertUnwindSafe(|| registration.plugin.destroy())) {
        Ok(Ok(())) => debug!(plugin = %name, "Destroyed plugin"),
        Ok(Err(e)) => error!(plugin = %name, error = %e, "Error destroying plugin"),
        Err(_) => error!(plugin = %name, "Plugin destroy panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{ContextPatch, PluginMetadata};
    use bakery_common::{vars, Vars};
    use parking_lot::Mutex;

    struct Recorder {
        metadata: PluginMetadata,
        log: Arc<Mutex<Vec<String>>>,
        fail_init: bool,
    }

    impl Recorder {
        fn new(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                metadata: PluginMetadata::new(name, "1.0.0", PluginKind::Middleware),
                log: Arc::clone(log),
                fail_init: false,
            }
        }

        fn depending_on(mut self, dependency: &str) -> Self {
            self.metadata = self.metadata.with_dependency(dependency);
            self
        }
    }

    impl Plugin for Recorder {
        fn metadata(&self) -> &PluginMetadata {
            &self.metadata
        }

        fn init(&self, options: &Vars) -> anyhow::Result<()> {
            if self.fail_init {
                anyhow::bail!("bad options");
            }
            self.log
                .lock()
                .push(format!("init {} {}", self.metadata.name, options.len()));
            Ok(())
        }

        fn after_translate(&self, context: &PluginContext) -> anyhow::Result<Option<String>> {
            self.log.lock().push(format!("after {}", self.metadata.name));
            Ok(context
                .result
                .as_ref()
                .map(|result| format!("{result}+{}", self.metadata.name)))
        }

        fn destroy(&self) -> anyhow::Result<()> {
            self.log.lock().push(format!("destroy {}", self.metadata.name));
            Ok(())
        }
    }

    struct Faulty {
        metadata: PluginMetadata,
        panic: bool,
    }

    impl Plugin for Faulty {
        fn metadata(&self) -> &PluginMetadata {
            &self.metadata
        }

        fn before_translate(&self, _context: &PluginContext) -> anyhow::Result<Option<ContextPatch>> {
            if self.panic {
                panic!("plugin bug");
            }
            anyhow::bail!("lookup service down")
        }
    }

    fn faulty(name: &str, panic: bool) -> Arc<dyn Plugin> {
        Arc::new(Faulty {
            metadata: PluginMetadata::new(name, "0.1.0", PluginKind::Processor),
            panic,
        })
    }

    struct Rekey;

    static REKEY_METADATA: once_cell::sync::Lazy<PluginMetadata> =
        once_cell::sync::Lazy::new(|| PluginMetadata::new("rekey", "1.0.0", PluginKind::Middleware));

    impl Plugin for Rekey {
        fn metadata(&self) -> &PluginMetadata {
            &REKEY_METADATA
        }

        fn before_translate(&self, context: &PluginContext) -> anyhow::Result<Option<ContextPatch>> {
            let key = context.key.clone().unwrap_or_default();
            Ok(Some(ContextPatch::default().key(format!("{key}_rekeyed"))))
        }
    }

    #[test]
    fn test_register_runs_init_with_options() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PluginManager::new();
        manager
            .register(
                Arc::new(Recorder::new("a", &log)),
                Some(PluginConfig::with_options(vars! { "x" => 1, "y" => 2 })),
            )
            .unwrap();

        assert!(manager.has("a"));
        assert_eq!(manager.len(), 1);
        assert_eq!(*log.lock(), vec!["init a 2".to_string()]);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PluginManager::new();
        manager.register(Arc::new(Recorder::new("a", &log)), None).unwrap();

        let err = manager
            .register(Arc::new(Recorder::new("a", &log)), None)
            .unwrap_err();
        assert!(matches!(err, I18nError::PluginAlreadyRegistered(name) if name == "a"));
    }

    #[test]
    fn test_missing_dependency_is_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PluginManager::new();

        let err = manager
            .register(Arc::new(Recorder::new("b", &log).depending_on("a")), None)
            .unwrap_err();
        assert!(matches!(
            err,
            I18nError::MissingDependency { ref plugin, ref dependency } if plugin == "b" && dependency == "a"
        ));
        assert!(!manager.has("b"));
    }

    #[test]
    fn test_init_failure_is_wrapped() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PluginManager::new();
        let mut plugin = Recorder::new("broken", &log);
        plugin.fail_init = true;

        let err = manager.register(Arc::new(plugin), None).unwrap_err();
        assert!(err.to_string().contains("Failed to initialize plugin 'broken'"));
        assert!(!manager.has("broken"));
    }

    #[test]
    fn test_unregister_respects_dependents() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PluginManager::new();
        manager.register(Arc::new(Recorder::new("a", &log)), None).unwrap();
        manager
            .register(Arc::new(Recorder::new("b", &log).depending_on("a")), None)
            .unwrap();

        let err = manager.unregister("a").unwrap_err();
        assert!(matches!(err, I18nError::PluginInUse { ref dependent, .. } if dependent == "b"));

        assert!(manager.unregister("b").unwrap());
        assert!(manager.unregister("a").unwrap());
        assert!(!manager.unregister("a").unwrap());
        assert!(log.lock().contains(&"destroy b".to_string()));
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PluginManager::new();
        manager.register(Arc::new(Recorder::new("first", &log)), None).unwrap();
        manager.register(Arc::new(Recorder::new("second", &log)), None).unwrap();

        let mut context = PluginContext::for_locale("en");
        context.result = Some("hi".into());
        manager.execute_hook(Hook::AfterTranslate, &mut context);

        assert_eq!(context.result.as_deref(), Some("hi+first+second"));
    }

    #[test]
    fn test_failing_plugins_do_not_stop_others() {
        let manager = PluginManager::new();
        manager.register(faulty("erroring", false), None).unwrap();
        manager.register(faulty("panicking", true), None).unwrap();
        manager.register(Arc::new(Rekey), None).unwrap();

        let mut context = PluginContext::for_locale("en");
        context.key = Some("title".into());
        manager.execute_hook(Hook::BeforeTranslate, &mut context);

        assert_eq!(context.key.as_deref(), Some("title_rekeyed"));
        assert_eq!(context.locale, "en");
    }

    #[test]
    fn test_disabled_plugins_are_skipped() {
        let manager = PluginManager::new();
        manager.register(Arc::new(Rekey), Some(PluginConfig::disabled())).unwrap();

        let mut context = PluginContext::for_locale("en");
        context.key = Some("title".into());
        manager.execute_hook(Hook::BeforeTranslate, &mut context);
        assert_eq!(context.key.as_deref(), Some("title"));

        assert!(manager.set_enabled("rekey", true));
        manager.execute_hook(Hook::BeforeTranslate, &mut context);
        assert_eq!(context.key.as_deref(), Some("title_rekeyed"));
        assert!(!manager.set_enabled("unknown", true));
    }

    #[test]
    fn test_by_kind_and_clear() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let manager = PluginManager::new();
        manager.register(Arc::new(Recorder::new("a", &log)), None).unwrap();
        manager
            .register(Arc::new(Recorder::new("b", &log).depending_on("a")), None)
            .unwrap();
        manager.register(faulty("p", false), None).unwrap();

        assert_eq!(manager.by_kind(PluginKind::Middleware).len(), 2);
        assert_eq!(manager.by_kind(PluginKind::Processor).len(), 1);
        assert!(manager.get("p").is_some());

        manager.clear();
        assert!(manager.is_empty());
        let destroyed: Vec<String> = log
            .lock()
            .iter()
            .filter(|entry| entry.starts_with("destroy"))
            .cloned()
            .collect();
        assert_eq!(destroyed, vec!["destroy b".to_string(), "destroy a".to_string()]);
    }
}
