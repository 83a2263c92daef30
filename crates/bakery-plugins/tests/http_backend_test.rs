//! HttpBackend against a throwaway local HTTP server.

use bakery_common::test_utils::init_test_logging;
use bakery_config::I18nSettings;
use bakery_core::{I18nConfig, Loader, TranslationService};
use bakery_plugins::{HttpBackend, HttpBackendConfig};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

/// Serves fixed `(status, body)` responses by request path; anything else is a 404.
async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: HashMap<_, _> = routes
        .into_iter()
        .map(|(path, status, body)| (path.to_string(), (status, body)))
        .collect();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes.get(&path).copied().unwrap_or((404, "not found"));
                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn backend(addr: SocketAddr, config: HttpBackendConfig) -> HttpBackend {
    init_test_logging();
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    HttpBackend::new(config.with_base_url(base).with_timeout(5)).unwrap()
}

#[tokio::test]
async fn test_loads_namespace_from_pattern() {
    let addr = serve(vec![(
        "/locales/en/common.json",
        200,
        r#"{"hello":"Hello","nav":{"home":"Home"}}"#,
    )])
    .await;
    let backend = backend(addr, HttpBackendConfig::new("/locales/{{lng}}/{{ns}}.json"));

    let map = backend.load("en", "common").await.unwrap().unwrap();
    assert_eq!(map["hello"].as_text(), Some("Hello"));
    assert!(map.contains_key("nav"));
}

#[tokio::test]
async fn test_unavailable_namespaces_yield_none() {
    let addr = serve(vec![
        ("/locales/en/broken.json", 200, "{ not json"),
        ("/locales/en/down.json", 503, "{}"),
    ])
    .await;
    let backend = backend(addr, HttpBackendConfig::new("/locales/{{lng}}/{{ns}}.json"));

    assert!(backend.load("en", "absent").await.unwrap().is_none());
    assert!(backend.load("en", "broken").await.unwrap().is_none());
    assert!(backend.load("en", "down").await.unwrap().is_none());
}

#[tokio::test]
async fn test_manifest_entries_take_precedence() {
    let addr = serve(vec![
        ("/manifest.json", 200, r#"{"en/common":"/bundles/en/common.3f9a.json"}"#),
        ("/bundles/en/common.3f9a.json", 200, r#"{"hello":"Hashed hello"}"#),
        ("/locales/de/common.json", 200, r#"{"hello":"Hallo"}"#),
    ])
    .await;
    let backend = backend(
        addr,
        HttpBackendConfig::new("/locales/{{lng}}/{{ns}}.json").with_manifest("/manifest.json"),
    );

    assert_eq!(backend.load_manifest().await.len(), 1);

    let en = backend.load("en", "common").await.unwrap().unwrap();
    assert_eq!(en["hello"].as_text(), Some("Hashed hello"));

    let de = backend.load("de", "common").await.unwrap().unwrap();
    assert_eq!(de["hello"].as_text(), Some("Hallo"));
}

#[tokio::test]
async fn test_failed_manifest_falls_back_to_pattern() {
    let addr = serve(vec![("/locales/en/common.json", 200, r#"{"hello":"Hello"}"#)]).await;
    let backend = backend(
        addr,
        HttpBackendConfig::new("/locales/{{lng}}/{{ns}}.json").with_manifest("/missing-manifest.json"),
    );

    assert!(backend.load_manifest().await.is_empty());
    assert!(backend.load("en", "common").await.unwrap().is_some());
}

#[tokio::test]
async fn test_service_loads_over_http() {
    let addr = serve(vec![("/locales/en/shop.json", 200, r#"{"cart":"Cart"}"#)]).await;
    let backend = Arc::new(backend(addr, HttpBackendConfig::new("/locales/{{lng}}/{{ns}}.json")));

    let service = TranslationService::new(
        I18nConfig::new(I18nSettings::for_locale("en").with_default_namespace("common"))
            .with_plugin(backend.clone())
            .with_loader(backend),
    )
    .unwrap();

    assert_eq!(service.t("shop:cart", "Basket"), "Basket");
    service.wait_idle().await;
    assert_eq!(service.t("shop:cart", "Basket"), "Cart");
    assert!(service.plugins().has("http-backend"));
}
