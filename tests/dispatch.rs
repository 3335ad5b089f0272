//! Request dispatch through the full router stack.

use axum::http::{header, StatusCode};
use metrics_exporter_prometheus::PrometheusBuilder;

mod common;

use common::{body_text, get, test_server};

#[tokio::test]
async fn test_operational_endpoints_only_on_localhost() {
    let router = test_server().router();

    for path in ["/healthy", "/metrics"] {
        let res = get(router.clone(), "localhost", path).await;
        assert_eq!(res.status(), StatusCode::OK, "localhost{path}");

        let res = get(router.clone(), "example.com", path).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "example.com{path}");
    }
}

#[tokio::test]
async fn test_localhost_with_port_is_gated() {
    let router = test_server().router();

    let res = get(router.clone(), "localhost:8080", "/healthy").await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = get(router, "localhost:8080", "/notfound").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_body() {
    let res = get(test_server().router(), "localhost", "/healthy").await;
    let body: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_interstitial_page() {
    let res = get(test_server().router(), "testhost", "/my-path").await;

    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let body = body_text(res).await;
    assert!(body.contains("my-new-path"));
    assert!(body.contains(r#"id="countdown""#));
}

#[tokio::test]
async fn test_immediate_redirect_keeps_path() {
    let res = get(test_server().router(), "testhost:8080", "/direct").await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[header::LOCATION], "https://example.com/direct");
    assert!(body_text(res).await.is_empty());
}

#[tokio::test]
async fn test_root_fallback() {
    let res = get(test_server().router(), "testhost", "/anything-else").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("example.com"));
}

#[tokio::test]
async fn test_wildcard_fallback() {
    let res = get(test_server().router(), "wildhost", "/whatever?x=1").await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers()[header::LOCATION],
        "https://wild.example.com/whatever?x=1"
    );
}

#[tokio::test]
async fn test_unknown_host_is_not_found() {
    let res = get(test_server().router(), "unknown.example", "/my-path").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body_text(res).await.is_empty());
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let res = get(test_server().router(), "testhost", "/direct").await;
    let id = res.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid_like(id), "unexpected request id {id}");
}

#[test]
fn test_metric_series_stay_bounded() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    metrics::with_local_recorder(&recorder, || {
        runtime.block_on(async {
            let router = test_server().router();
            for i in 0..200 {
                let path = format!("/random-{i}");
                let res = get(router.clone(), "testhost", &path).await;
                assert_eq!(res.status(), StatusCode::OK);
                let res = get(router.clone(), "wildhost", &path).await;
                assert_eq!(res.status(), StatusCode::FOUND);
                let res = get(router.clone(), &format!("junk-{i}.invalid"), "/").await;
                assert_eq!(res.status(), StatusCode::NOT_FOUND);
            }
        })
    });

    let rendered = handle.render();
    let series = |name: &str| {
        rendered
            .lines()
            .filter(|line| line.starts_with(name))
            .collect::<Vec<_>>()
    };

    let redirects = series("redirector_redirects_total");
    assert_eq!(redirects.len(), 2, "{rendered}");
    assert!(redirects
        .iter()
        .any(|l| l.contains(r#"host="testhost""#) && l.contains(r#"pattern="/""#) && l.ends_with(" 200")));
    assert!(redirects
        .iter()
        .any(|l| l.contains(r#"host="wildhost""#) && l.contains(r#"pattern="*""#) && l.ends_with(" 200")));
    assert!(!rendered.contains("random-"));

    let not_found = series("redirector_not_found_total");
    assert_eq!(not_found, vec!["redirector_not_found_total 200"]);
}

fn uuid_like(id: &str) -> bool {
    id.len() == 36 && id.chars().filter(|c| *c == '-').count() == 4
}
