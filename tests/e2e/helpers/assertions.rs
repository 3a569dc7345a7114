use serde_json::Value;

/// Check the shape of a POST /api/generate response and return its filename
pub fn assert_generation_response(body: &Value, expected_source: &str) -> String {
    assert_eq!(body.get("success").and_then(|v| v.as_bool()), Some(true));

    let file_id = body
        .get("file_id")
        .and_then(|v| v.as_str())
        .expect("Missing file_id");
    let filename = body
        .get("filename")
        .and_then(|v| v.as_str())
        .expect("Missing filename");
    assert_eq!(filename, format!("{}.mp3", file_id));
    assert_eq!(
        body.get("url").and_then(|v| v.as_str()),
        Some(format!("/get-audio/{}", filename).as_str())
    );
    assert_eq!(
        body.get("source_type").and_then(|v| v.as_str()),
        Some(expected_source)
    );
    assert!(body.get("text_length").and_then(|v| v.as_u64()).is_some());
    assert!(body.get("num_chunks").and_then(|v| v.as_u64()).is_some());
    assert!(body.get("processing_time_secs").is_some());
    assert!(body.get("original_filename").is_some());

    filename.to_string()
}

pub fn assert_history_item(item: &Value) {
    assert!(item.get("timestamp").and_then(|v| v.as_str()).is_some());
    assert!(item.get("text").and_then(|v| v.as_str()).is_some());
    assert!(item.get("voice").and_then(|v| v.as_str()).is_some());
    assert!(item.get("model").and_then(|v| v.as_str()).is_some());
    assert!(item.get("filename").and_then(|v| v.as_str()).is_some());
    assert!(item.get("file_id").and_then(|v| v.as_str()).is_some());
    assert!(item.get("file_size").and_then(|v| v.as_u64()).is_some());
    assert!(item
        .get("file_size_formatted")
        .and_then(|v| v.as_str())
        .is_some());
    assert!(item.get("source_type").and_then(|v| v.as_str()).is_some());
}
