use crate::e2e::helpers;

use helpers::assertions::assert_history_item;
use helpers::TestContext;
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

async fn generate(ctx: &TestContext, text: &str) -> String {
    let response = ctx
        .client
        .post("/api/generate", &json!({ "text": text }))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    response.body()["filename"].as_str().unwrap().to_string()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_start_with_empty_history(ctx: &TestContext) {
    let response = ctx.client.get("/api/history").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body(), &json!([]));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_generations_newest_first(ctx: &TestContext) {
    let first = generate(ctx, "The first generation.").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = generate(ctx, "The second generation.").await;

    let response = ctx.client.get("/api/history").await.unwrap();

    response.assert_status(StatusCode::OK);
    let items = response.body().as_array().unwrap();
    assert_eq!(items.len(), 2);
    items.iter().for_each(assert_history_item);
    assert_eq!(items[0]["filename"], second.as_str());
    assert_eq!(items[1]["filename"], first.as_str());
    assert_eq!(items[1]["text"], "The first generation.");
    assert_eq!(items[1]["voice"], "alloy");
    assert_eq!(items[1]["model"], "tts-1");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_store_truncated_previews(ctx: &TestContext) {
    let text = "word ".repeat(40);
    generate(ctx, &text).await;

    let response = ctx.client.get("/api/history").await.unwrap();

    let preview = response.body()[0]["text"].as_str().unwrap().to_string();
    assert!(preview.ends_with("..."));
    assert_eq!(
        preview.chars().count(),
        helpers::TEST_PREVIEW_LENGTH + "...".len()
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_delete_one_generation(ctx: &TestContext) {
    let keep = generate(ctx, "Keep me.").await;
    let remove = generate(ctx, "Remove me.").await;

    let response = ctx
        .client
        .delete(&format!("/api/history/{}", remove))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["file_deleted"], true);
    assert!(!ctx.output_path(&remove).exists());
    assert!(ctx.output_path(&keep).exists());

    let history = ctx.client.get("/api/history").await.unwrap();
    let items = history.body().as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["filename"], keep.as_str());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_when_deleting_unknown_file(ctx: &TestContext) {
    let response = ctx
        .client
        .delete("/api/history/missing.mp3")
        .await
        .unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_path_traversal_on_delete(ctx: &TestContext) {
    let response = ctx
        .client
        .delete("/api/history/..%2Fhistory.json")
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Invalid filename");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clear_all_history(ctx: &TestContext) {
    let a = generate(ctx, "Alpha.").await;
    let b = generate(ctx, "Beta.").await;

    let response = ctx.client.delete("/api/history").await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body()["entries_removed"], 2);
    assert_eq!(response.body()["files_deleted"], 2);
    assert!(!ctx.output_path(&a).exists());
    assert!(!ctx.output_path(&b).exists());

    let history = ctx.client.get("/api/history").await.unwrap();
    assert_eq!(history.body(), &json!([]));
}
