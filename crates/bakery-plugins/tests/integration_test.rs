//! Bundled plugins wired into a running translation service.

use bakery_common::test_utils::init_test_logging;
use bakery_common::vars;
use bakery_config::{I18nSettings, MessageFormat};
use bakery_core::store::from_json;
use bakery_core::{I18nConfig, Plugin, PluginKind, TranslationService};
use bakery_plugins::{CapitalizePlugin, LogSaver, MemorySaver, NumberFormatPlugin, StaticLoader};
use serde_json::json;
use std::sync::Arc;

fn english() -> I18nSettings {
    I18nSettings::for_locale("en").with_default_namespace("common")
}

fn service(config: I18nConfig) -> TranslationService {
    init_test_logging();
    TranslationService::new(config).unwrap()
}

#[test]
fn test_capitalize_suffixes() {
    let service = service(I18nConfig::new(english()).with_plugin(Arc::new(CapitalizePlugin::new())));
    service.add_translations(
        "en",
        "common",
        from_json(json!({ "greeting": "hello {{name}}", "page": { "name": "the shop floor" } }))
            .unwrap(),
    );

    assert_eq!(service.t("greeting_upper", vars! { "name" => "ann" }), "HELLO ANN");
    assert_eq!(service.t("greeting_capitalize", vars! { "name" => "ann" }), "Hello ann");
    assert_eq!(service.t("common:page.name_title", ()), "The Shop Floor");
    assert_eq!(service.t("greeting", vars! { "name" => "ann" }), "hello ann");
}

#[test]
fn test_number_tokens_follow_locale() {
    let service = service(
        I18nConfig::new(english()).with_plugin(Arc::new(NumberFormatPlugin::new())),
    );
    let table = json!({
        "total": "Total: {amount|currency}",
        "count": "Count: {amount|number}",
        "progress": "Progress: {done|percent}",
        "views": "{views|compact} views"
    });
    service.add_translations("en", "shop", from_json(table.clone()).unwrap());
    service.add_translations("de", "shop", from_json(table).unwrap());

    let vars = vars! { "amount" => 1234.56, "done" => 75.5, "views" => 1_500_000 };
    assert_eq!(service.t("shop:total", vars.clone()), "Total: $1,234.56");
    assert_eq!(service.t("shop:count", vars.clone()), "Count: 1,234.56");
    assert_eq!(service.t("shop:progress", vars.clone()), "Progress: 75.50%");
    assert_eq!(service.t("shop:views", vars.clone()), "1.5M views");

    service.set_locale("de");
    assert_eq!(service.t("shop:count", vars), "Count: 1.234,56");
}

#[test]
fn test_processor_and_formatter_compose() {
    let service = service(
        I18nConfig::new(english())
            .with_plugin(Arc::new(CapitalizePlugin::new()))
            .with_plugin(Arc::new(NumberFormatPlugin::new())),
    );
    service.add_translations(
        "en",
        "common",
        from_json(json!({ "price": "only {amount|currency:EUR}" })).unwrap(),
    );

    assert_eq!(service.t("price_capitalize", vars! { "amount" => 5 }), "Only €5.00");

    let processors = service.plugins().by_kind(PluginKind::Processor);
    assert_eq!(processors.len(), 1);
    assert_eq!(processors[0].metadata().name, "capitalize");
}

#[test]
fn test_number_tokens_survive_icu() {
    let service = service(
        I18nConfig::new(english().with_message_format(MessageFormat::Icu))
            .with_plugin(Arc::new(NumberFormatPlugin::new())),
    );
    service.add_translations(
        "en",
        "common",
        from_json(json!({
            "cart": "{count, plural, one {# item} other {# items}} for {total|currency}"
        }))
        .unwrap(),
    );

    assert_eq!(
        service.t("cart", vars! { "count" => 3, "total" => 19.5 }),
        "3 items for $19.50"
    );
}

#[tokio::test]
async fn test_static_loader_fills_namespace_in_background() {
    let loader = StaticLoader::new()
        .with_json("en", "shop", json!({ "cart": { "title": "Your cart" } }))
        .unwrap();
    let service = service(I18nConfig::new(english()).with_loader(Arc::new(loader)));

    assert_eq!(service.t("shop:cart.title", ()), "shop:cart.title");
    service.wait_idle().await;

    assert!(service.is_loaded("en", "shop"));
    assert_eq!(service.t("shop:cart.title", ()), "Your cart");
}

#[tokio::test]
async fn test_memory_saver_collects_missing_keys_once() {
    let saver = Arc::new(MemorySaver::new());
    let service = service(
        I18nConfig::new(english().with_save_missing(true))
            .with_saver(saver.clone()),
    );

    assert_eq!(service.t("checkout.title", "Checkout"), "Checkout");
    service.wait_idle().await;
    assert_eq!(service.t("checkout.title", "Checkout"), "Checkout");
    service.wait_idle().await;

    let entries = saver.drain();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].locale, "en");
    assert_eq!(entries[0].namespace, "checkout");
    assert_eq!(entries[0].key, "title");
    assert_eq!(entries[0].value, "Checkout");
}

#[tokio::test]
async fn test_log_saver_accepts_missing_keys() {
    let service = service(
        I18nConfig::new(english().with_save_missing(true)).with_saver(Arc::new(LogSaver::new())),
    );

    assert_eq!(service.t("nowhere", ()), "nowhere");
    service.wait_idle().await;
}
