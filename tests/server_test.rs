//! End-to-end tests against a running server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use custom_error_pages::observability::metrics::{REQUEST_COUNT, REQUEST_DURATION};
use custom_error_pages::observability::{NoopSink, PrometheusSink};

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_healthz() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, shutdown, handle) =
        common::start_server(common::config_for(dir.path()), Arc::new(NoopSink)).await;

    let res = client()
        .get(format!("http://{}/healthz", addr))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "message": "OK" }));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_error_page_over_the_wire() {
    let (addr, shutdown, _) = common::start_server(
        common::config_for(&common::knockout_theme()),
        Arc::new(NoopSink),
    )
    .await;

    let res = client()
        .get(format!("http://{}/some/intercepted/path", addr))
        .header("X-Code", "503")
        .header("X-Request-ID", "req-42")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    assert_eq!(res.headers()["content-type"], "text/html");
    let body = res.text().await.unwrap();
    assert!(body.contains("The server is temporary busy, try again later!"));
    assert!(body.contains("req-42"));

    let res = client()
        .post(format!("http://{}/", addr))
        .header("X-Code", "413")
        .header("X-Format", "application/json")
        .body("ignored")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "413");
    assert_eq!(body["title"], "Payload Too Large");

    shutdown.trigger();
}

#[tokio::test]
async fn test_metrics_exposition() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(PrometheusSink::new().unwrap());
    let (addr, shutdown, _) = common::start_server(common::config_for(dir.path()), sink).await;
    let client = client();

    for _ in 0..3 {
        client
            .get(format!("http://{}/", addr))
            .header("X-Format", "application/json")
            .send()
            .await
            .unwrap();
    }
    // Health checks are not counted.
    client.get(format!("http://{}/healthz", addr)).send().await.unwrap();

    let res = client.get(format!("http://{}/metrics", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let text = res.text().await.unwrap();

    assert!(
        text.contains(&format!("{}{{proto=\"1.1\"}} 3", REQUEST_COUNT)),
        "{}",
        text
    );
    assert!(
        text.contains(&format!("{}_count{{proto=\"1.1\"}} 3", REQUEST_DURATION)),
        "{}",
        text
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_metrics_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, shutdown, _) =
        common::start_server(common::config_for(dir.path()), Arc::new(NoopSink)).await;

    let res = client()
        .get(format!("http://{}/metrics", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_requests_are_all_counted() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(common::RecordingSink::default());
    let (addr, shutdown, _) =
        common::start_server(common::config_for(dir.path()), sink.clone()).await;
    let client = client();

    let requests = (0..50).map(|i| {
        let client = client.clone();
        async move {
            client
                .get(format!("http://{}/", addr))
                .header("X-Code", if i % 2 == 0 { "502" } else { "504" })
                .header("X-Format", "application/json")
                .send()
                .await
                .unwrap()
                .status()
        }
    });
    let statuses = spawn_all(requests).await;

    assert_eq!(statuses.iter().filter(|s| s.as_u16() == 502).count(), 25);
    assert_eq!(statuses.iter().filter(|s| s.as_u16() == 504).count(), 25);
    assert_eq!(sink.total(), 50);

    shutdown.trigger();
}

async fn spawn_all<F>(futures: impl Iterator<Item = F>) -> Vec<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut outputs = Vec::with_capacity(handles.len());
    for handle in handles {
        outputs.push(handle.await.unwrap());
    }
    outputs
}
