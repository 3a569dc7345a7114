use crate::e2e::helpers;

use helpers::TestContext;
use hyper::StatusCode;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ok_for_health_check(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    assert_eq!(response.text(), "OK");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_ready_status(ctx: &TestContext) {
    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("ready"));
    assert_eq!(
        body.get("output_dir").and_then(|v| v.as_str()),
        Some("available")
    );
    assert_eq!(
        body.get("history").and_then(|v| v.as_str()),
        Some("available")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_not_ready_without_output_dir(ctx: &TestContext) {
    std::fs::remove_dir_all(&ctx.config.output_dir).unwrap();

    let response = ctx.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.body().get("status").and_then(|v| v.as_str()),
        Some("not_ready")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_api_health_with_timestamp(ctx: &TestContext) {
    let response = ctx.client.get("/api/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("healthy"));
    let timestamp = body.get("timestamp").and_then(|v| v.as_str()).unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_environment_without_secrets(ctx: &TestContext) {
    let response = ctx.client.get("/api/check-environment").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body();
    assert_eq!(
        body.get("openai_api_key_set").and_then(|v| v.as_bool()),
        Some(true)
    );
    assert_eq!(
        body.get("sample_generation_enabled").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert!(!response.text().contains("sk-test"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_include_request_id_in_responses(ctx: &TestContext) {
    let response = ctx.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");

    let response = ctx.client.get("/api/history").await.unwrap();
    response.assert_header_exists("x-request-id");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_echo_client_request_id(ctx: &TestContext) {
    let response = ctx
        .client
        .get_with_headers("/health", &[("x-request-id", "trace-abc-123")])
        .await
        .unwrap();

    response.assert_header("x-request-id", "trace-abc-123");
}
