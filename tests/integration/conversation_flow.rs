//! Conversation surface flows: append, reply, edit, failure paths, and
//! recency listing, all through the HTTP router.

use crate::common::{body_json, get_as, post_json, send, test_app};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

fn conversation_uri(task_id: Uuid) -> String {
    format!("/api/tasks/{}/conversation", task_id)
}

#[tokio::test]
async fn test_get_unknown_task_yields_empty_document() {
    let (router, _) = test_app();
    let task_id = Uuid::new_v4();

    let response = send(&router, get_as(&conversation_uri(task_id), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert_eq!(doc["taskId"], json!(task_id));
    assert_eq!(doc["thread"], json!([]));
}

#[tokio::test]
async fn test_append_prefixes_and_persists() {
    let (router, _) = test_app();
    let task_id = Uuid::new_v4();

    let response = send(
        &router,
        post_json(
            &conversation_uri(task_id),
            Some("alice"),
            &json!({"content": "hello team"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    let content = doc["thread"][0]["content"].as_str().unwrap();
    assert!(content.starts_with("ALI("));
    assert!(content.ends_with("): hello team"));
    assert_eq!(doc["thread"][0]["replies"], json!([]));

    // A fresh GET returns the same canonical document.
    let reread = body_json(send(&router, get_as(&conversation_uri(task_id), None)).await).await;
    assert_eq!(reread["thread"], doc["thread"]);
}

#[tokio::test]
async fn test_reply_relocates_touched_thread_to_end() {
    let (router, _) = test_app();
    let task_id = Uuid::new_v4();
    let uri = conversation_uri(task_id);

    send(&router, post_json(&uri, Some("alice"), &json!({"content": "first"}))).await;
    send(&router, post_json(&uri, Some("bob"), &json!({"content": "second"}))).await;

    let response = send(
        &router,
        post_json(&uri, Some("bob"), &json!({"content": "re: first", "path": [0]})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    let thread = doc["thread"].as_array().unwrap();
    assert_eq!(thread.len(), 2);
    // The replied-to thread moved to the end with the reply attached.
    assert!(thread[0]["content"].as_str().unwrap().ends_with("second"));
    assert!(thread[1]["content"].as_str().unwrap().ends_with("first"));
    assert!(thread[1]["replies"][0]["content"]
        .as_str()
        .unwrap()
        .ends_with("re: first"));
}

#[tokio::test]
async fn test_edit_replaces_content_keeps_replies() {
    let (router, _) = test_app();
    let task_id = Uuid::new_v4();
    let uri = conversation_uri(task_id);

    send(&router, post_json(&uri, Some("alice"), &json!({"content": "original"}))).await;
    send(
        &router,
        post_json(&uri, Some("bob"), &json!({"content": "a reply", "path": [0]})),
    )
    .await;

    let response = send(
        &router,
        post_json(
            &uri,
            Some("alice"),
            &json!({"content": "corrected", "path": [0], "isEdit": true}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    let edited = &doc["thread"][0];
    assert!(edited["content"].as_str().unwrap().ends_with("corrected"));
    assert_eq!(edited["replies"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_path_conflict_leaves_thread_unchanged() {
    let (router, _) = test_app();
    let task_id = Uuid::new_v4();
    let uri = conversation_uri(task_id);

    send(&router, post_json(&uri, Some("alice"), &json!({"content": "only one"}))).await;

    let response = send(
        &router,
        post_json(&uri, Some("bob"), &json!({"content": "lost", "path": [7]})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let failure = body_json(response).await;
    assert_eq!(failure["ok"], json!(false));
    assert_eq!(failure["reason"], json!("invalid_path"));

    let doc = body_json(send(&router, get_as(&uri, None)).await).await;
    assert_eq!(doc["thread"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_content_rejected() {
    let (router, _) = test_app();
    let uri = conversation_uri(Uuid::new_v4());

    let response = send(&router, post_json(&uri, Some("alice"), &json!({"content": "   "}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let failure = body_json(response).await;
    assert_eq!(failure["reason"], json!("malformed_content"));
}

#[tokio::test]
async fn test_edit_without_path_rejected() {
    let (router, _) = test_app();
    let uri = conversation_uri(Uuid::new_v4());

    let response = send(
        &router,
        post_json(&uri, Some("alice"), &json!({"content": "x", "isEdit": true})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mutation_requires_identity() {
    let (router, _) = test_app();
    let uri = conversation_uri(Uuid::new_v4());

    let response = send(&router, post_json(&uri, None, &json!({"content": "anonymous"}))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_recent_lists_latest_activity_first() {
    let (router, _) = test_app();
    let first_task = Uuid::new_v4();
    let second_task = Uuid::new_v4();

    send(
        &router,
        post_json(&conversation_uri(first_task), Some("alice"), &json!({"content": "a"})),
    )
    .await;
    send(
        &router,
        post_json(&conversation_uri(second_task), Some("alice"), &json!({"content": "b"})),
    )
    .await;

    let response = send(&router, get_as("/api/conversations/recent", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let listing = body_json(response).await;
    let tasks: Vec<_> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["taskId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(tasks, vec![second_task.to_string(), first_task.to_string()]);
}
