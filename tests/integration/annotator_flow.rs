//! Field-change intake flows: templates that annotate, misses that skip,
//! and owner handovers, through the HTTP router.

use crate::common::{body_json, get_as, post_json, send, test_app};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

fn changes_uri(task_id: Uuid) -> String {
    format!("/api/tasks/{}/changes", task_id)
}

fn conversation_uri(task_id: Uuid) -> String {
    format!("/api/tasks/{}/conversation", task_id)
}

#[tokio::test]
async fn test_status_change_appends_annotation() {
    let (router, _) = test_app();
    let task_id = Uuid::new_v4();

    let response = send(
        &router,
        post_json(
            &changes_uri(task_id),
            Some("alice"),
            &json!({"changes": [
                {"field": "status", "oldValue": "Pending", "newValue": "Completed"}
            ]}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let result = body_json(response).await;
    assert_eq!(result["ok"], json!(true));
    assert_eq!(result["appended"], json!(1));

    let doc = body_json(send(&router, get_as(&conversation_uri(task_id), None)).await).await;
    let content = doc["thread"][0]["content"].as_str().unwrap();
    assert!(content.starts_with("ALI("));
    assert!(content.ends_with("Task marked as completed."));
}

#[tokio::test]
async fn test_unmatched_change_leaves_thread_untouched() {
    let (router, _) = test_app();
    let task_id = Uuid::new_v4();

    let response = send(
        &router,
        post_json(
            &changes_uri(task_id),
            Some("alice"),
            &json!({"changes": [
                {"field": "due_date", "oldValue": "2026-01-01", "newValue": "2026-02-01"}
            ]}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["appended"], json!(0));

    let doc = body_json(send(&router, get_as(&conversation_uri(task_id), None)).await).await;
    assert_eq!(doc["thread"], json!([]));
}

#[tokio::test]
async fn test_owner_handover_names_both_owners() {
    let (router, _) = test_app();
    let task_id = Uuid::new_v4();

    send(
        &router,
        post_json(
            &changes_uri(task_id),
            Some("alice"),
            &json!({"changes": [
                {"field": "owner", "oldValue": "alice", "newValue": "bob"}
            ]}),
        ),
    )
    .await;

    let doc = body_json(send(&router, get_as(&conversation_uri(task_id), None)).await).await;
    let content = doc["thread"][0]["content"].as_str().unwrap();
    assert!(content.ends_with("alice handed this task over to bob."));
}

#[tokio::test]
async fn test_mixed_batch_annotates_matches_only() {
    let (router, _) = test_app();
    let task_id = Uuid::new_v4();

    let response = send(
        &router,
        post_json(
            &changes_uri(task_id),
            Some("carol"),
            &json!({"changes": [
                {"field": "status", "oldValue": "Pending", "newValue": "In Progress"},
                {"field": "priority", "oldValue": "Low", "newValue": "High"}
            ]}),
        ),
    )
    .await;
    assert_eq!(body_json(response).await["appended"], json!(1));

    let doc = body_json(send(&router, get_as(&conversation_uri(task_id), None)).await).await;
    assert_eq!(doc["thread"].as_array().unwrap().len(), 1);
    assert!(doc["thread"][0]["content"]
        .as_str()
        .unwrap()
        .starts_with("CAR("));
}

#[tokio::test]
async fn test_changes_require_identity() {
    let (router, _) = test_app();
    let response = send(
        &router,
        post_json(&changes_uri(Uuid::new_v4()), None, &json!({"changes": []})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
