//! End-to-end tests through the HTTP front.

use std::time::Duration;

use reqwest::StatusCode;
use uri_router::RoutingConfig;

mod common;

#[tokio::test]
async fn dispatches_index_with_request_id() {
    let server = common::start_server(common::fixture()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/", server.addr))
        .send()
        .await
        .expect("Server unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["target"]["controller_class"], "app::web::Index");
    assert_eq!(body["common_urls"]["urlAssets"], "http://static.example.com/assets/");

    server.shutdown.trigger();
}

#[tokio::test]
async fn client_request_id_is_preserved() {
    let server = common::start_server(common::fixture()).await;

    let res = common::client()
        .get(format!("http://{}/home", server.addr))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "abc-123");

    server.shutdown.trigger();
}

#[tokio::test]
async fn failed_prevalidation_redirects() {
    let server = common::start_server(common::fixture()).await;

    let res = common::client()
        .get(format!("http://{}/mycontroller/AB/abc", server.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    let location = res.headers()["location"].to_str().unwrap();
    assert_eq!(location, format!("http://{}/mycontroller", server.addr));

    server.shutdown.trigger();
}

#[tokio::test]
async fn unknown_controller_uses_404_redirect_then_not_found() {
    let server = common::start_server(common::fixture()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/no-such-page", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers()["location"].to_str().unwrap(),
        format!("http://{}", server.addr)
    );

    let mut config = common::fixture();
    config.redirects.clear();
    server.updates.send(config).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client
        .get(format!("http://{}/no-such-page", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.shutdown.trigger();
}

#[tokio::test]
async fn slash_normalization_redirects() {
    let config = RoutingConfig {
        redirect_last_slash: true,
        force_slash_on_index: true,
        ..common::fixture()
    };
    let server = common::start_server(config).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/blog/?page=2", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers()["location"].to_str().unwrap(),
        format!("http://{}/blog?page=2", server.addr)
    );

    let res = client
        .get(format!("http://{}/api", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers()["location"].to_str().unwrap(),
        format!("http://{}/api/", server.addr)
    );

    server.shutdown.trigger();
}

#[tokio::test]
async fn page_route_dispatches_registered_controller() {
    let server = common::start_server(common::fixture()).await;

    let res = common::client()
        .get(format!("http://{}/end-of-user-license-agreement", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["target"]["controller_class"], "app::web::Eula");

    server.shutdown.trigger();
}

#[tokio::test]
async fn reload_registers_new_namespace() {
    let server = common::start_server(common::fixture()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/shop", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);

    let mut config = common::fixture();
    config.segments.insert("shop".into(), "app::shop".into());
    server.updates.send(config).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client
        .get(format!("http://{}/shop", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["target"]["controller_class"], "app::shop::Index");

    server.shutdown.trigger();
}
