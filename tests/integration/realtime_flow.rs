//! Realtime fan-out: broadcast delivery to watchers, unread counters, and
//! presence, driven through the HTTP router where the surface exists.

use crate::common::{body_json, get_as, post_json, send, test_app};
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

fn conversation_uri(task_id: Uuid) -> String {
    format!("/api/tasks/{}/conversation", task_id)
}

#[tokio::test]
async fn test_post_broadcasts_to_watcher() {
    let (router, state) = test_app();
    let task_id = Uuid::new_v4();

    let conn = state.realtime.register("bob");
    let mut rx = state.realtime.watch(conn, task_id);

    send(
        &router,
        post_json(
            &conversation_uri(task_id),
            Some("alice"),
            &json!({"content": "look at this"}),
        ),
    )
    .await;

    let update = rx.recv().await.unwrap();
    assert_eq!(update.task_id, task_id);
    assert_eq!(update.current_user, "alice");
    assert!(update.thread[0].content.ends_with("look at this"));
}

#[tokio::test]
async fn test_annotation_broadcasts_to_watcher() {
    let (router, state) = test_app();
    let task_id = Uuid::new_v4();

    let conn = state.realtime.register("bob");
    let mut rx = state.realtime.watch(conn, task_id);

    send(
        &router,
        post_json(
            &format!("/api/tasks/{}/changes", task_id),
            Some("alice"),
            &json!({"changes": [
                {"field": "status", "oldValue": "Pending", "newValue": "In Progress"}
            ]}),
        ),
    )
    .await;

    let update = rx.recv().await.unwrap();
    assert!(update.thread[0].content.ends_with("Work started on this task."));
}

#[tokio::test]
async fn test_unmatched_change_broadcasts_nothing() {
    let (router, state) = test_app();
    let task_id = Uuid::new_v4();

    let conn = state.realtime.register("bob");
    let mut rx = state.realtime.watch(conn, task_id);

    send(
        &router,
        post_json(
            &format!("/api/tasks/{}/changes", task_id),
            Some("alice"),
            &json!({"changes": [
                {"field": "priority", "oldValue": "Low", "newValue": "High"}
            ]}),
        ),
    )
    .await;

    assert!(matches!(
        rx.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_unread_counts_for_connected_non_viewer() {
    let (router, state) = test_app();
    let task_id = Uuid::new_v4();
    let elsewhere = Uuid::new_v4();

    let carol = state.realtime.register("carol");
    state.realtime.watch(carol, elsewhere);

    send(
        &router,
        post_json(&conversation_uri(task_id), Some("alice"), &json!({"content": "news"})),
    )
    .await;

    let response = send(&router, get_as("/api/unread", Some("carol"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["unread"][task_id.to_string()], json!(1));

    // Watching the task clears the counter.
    state.realtime.watch(carol, task_id);
    let body = body_json(send(&router, get_as("/api/unread", Some("carol"))).await).await;
    assert_eq!(body["unread"], json!({}));
}

#[tokio::test]
async fn test_unread_requires_identity() {
    let (router, _) = test_app();
    let response = send(&router, get_as("/api/unread", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_presence_reflects_registered_connections() {
    let (router, state) = test_app();

    let conn = state.realtime.register("alice");
    let body = body_json(send(&router, get_as("/api/presence", None)).await).await;
    assert_eq!(body["online"]["alice"], json!(true));

    state.realtime.unregister(conn);
    let body = body_json(send(&router, get_as("/api/presence", None)).await).await;
    assert_eq!(body["online"], json!({}));
}
