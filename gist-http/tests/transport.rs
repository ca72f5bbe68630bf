use gist_http::{HttpClient, HttpError, RequestOpts};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn absolute(server: &MockServer, p: &str) -> String {
    format!("{}{}", server.uri(), p)
}

#[tokio::test]
async fn get_text_returns_html_and_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post"))
        .and(header("user-agent", "gist-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><p>Hi.</p></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::detached()
        .unwrap()
        .with_user_agent("gist-test/1.0")
        .unwrap();
    let body = client
        .get_text(&absolute(&server, "/post"), RequestOpts::default())
        .await
        .expect("page body");
    assert!(body.contains("<p>Hi.</p>"));
}

#[tokio::test]
async fn get_text_surfaces_non_success_as_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::detached().unwrap();
    let err = client
        .get_text(&absolute(&server, "/missing"), RequestOpts::default())
        .await
        .unwrap_err();
    match err {
        HttpError::Api {
            status, message, ..
        } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "not here");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn post_json_raw_keeps_error_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/demo"))
        .and(header("authorization", "Bearer hf_token"))
        .and(body_json(json!({ "inputs": "hello" })))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "Model demo is currently loading",
            "estimated_time": 12.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&format!("{}/", server.uri())).unwrap();
    let raw = client
        .post_json_raw(
            "models/demo",
            &json!({ "inputs": "hello" }),
            RequestOpts {
                auth: Some(gist_http::Auth::Bearer("hf_token")),
                ..Default::default()
            },
        )
        .await
        .expect("raw response");

    assert_eq!(raw.status.as_u16(), 503);
    assert!(!raw.is_success());
    assert_eq!(raw.error_message(), "Model demo is currently loading");
    let v: serde_json::Value = raw.json().unwrap();
    assert_eq!(v["estimated_time"], 12.5);
}

#[tokio::test]
async fn server_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let res = client.get_text("/down", RequestOpts::default()).await;
    assert!(matches!(res, Err(HttpError::Api { .. })));
}
