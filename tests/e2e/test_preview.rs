use crate::e2e::helpers;

use helpers::api_client::FormPart;
use helpers::fixtures::{pdf_with_text, sentences};
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_estimate_cost_for_json_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/preview-cost",
            &json!({ "text": "a".repeat(2000), "model": "tts-1" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body();
    assert_eq!(body["text_length"], 2000);
    assert_eq!(body["num_chunks"], 20);
    assert_eq!(body["model"], "tts-1");
    assert!((body["estimated_cost"].as_f64().unwrap() - 0.03).abs() < 1e-9);

    // Previews never call the speech API
    assert_eq!(ctx.speech.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_price_hd_model_double(ctx: &TestContext) {
    let text = sentences(4);

    let standard = ctx
        .client
        .post("/api/preview-cost", &json!({ "text": text }))
        .await
        .unwrap();
    let hd = ctx
        .client
        .post("/api/preview-cost", &json!({ "text": text, "model": "tts-1-hd" }))
        .await
        .unwrap();

    standard.assert_status(StatusCode::OK);
    hd.assert_status(StatusCode::OK);
    let standard_cost = standard.body()["estimated_cost"].as_f64().unwrap();
    let hd_cost = hd.body()["estimated_cost"].as_f64().unwrap();
    assert!((hd_cost - 2.0 * standard_cost).abs() < 1e-9);
    assert_eq!(hd.body()["num_chunks"], 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_preview_form_input_with_pdf(ctx: &TestContext) {
    let pdf = pdf_with_text("Previewed document");

    let response = ctx
        .client
        .post_form(
            "/api/preview",
            &[
                FormPart::Text("text", "Some intro."),
                FormPart::Text("model", "tts-1-hd"),
                FormPart::File {
                    name: "pdf_file",
                    filename: "preview.pdf",
                    content_type: "application/pdf",
                    bytes: &pdf,
                },
            ],
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body();
    assert!(body["text_length"].as_u64().unwrap() > "Some intro.".len() as u64);
    assert_eq!(body["num_chunks"], 1);
    assert_eq!(body["model"], "tts-1-hd");
    assert_eq!(ctx.speech.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_preview(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/preview-cost", &json!({ "text": "" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
}
