//! WebSocket transport flows: the INIT subscribe protocol, live delivery,
//! and re-targeting, against a server bound to an ephemeral port.

use crate::common::test_app;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use taskboard::backend::server::state::AppState;
use taskboard::shared::{ThreadMessage, ThreadUpdate};
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn spawn_server() -> (SocketAddr, AppState) {
    let (router, state) = test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, state)
}

async fn connect(addr: SocketAddr, user: &str) -> Socket {
    let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws?user={}", addr, user))
        .await
        .unwrap();
    socket
}

fn init_frame(task_id: Uuid) -> Message {
    Message::Text(format!(r#"{{"type":"INIT","taskId":"{}"}}"#, task_id).into())
}

fn update(task_id: Uuid, user: &str, content: &str) -> ThreadUpdate {
    ThreadUpdate::new(task_id, vec![ThreadMessage::new(content)], user)
}

async fn next_update(socket: &mut Socket) -> ThreadUpdate {
    let message = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .expect("no update arrived within the deadline")
        .unwrap()
        .unwrap();
    serde_json::from_str(message.to_text().unwrap()).unwrap()
}

/// Poll until the registry reflects an asynchronously handled frame.
async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("registry never reached the expected state");
}

#[tokio::test]
async fn test_init_subscribes_and_delivers_updates() {
    let (addr, state) = spawn_server().await;
    let task_id = Uuid::new_v4();

    let mut socket = connect(addr, "bob").await;
    socket.send(init_frame(task_id)).await.unwrap();
    {
        let state = state.clone();
        wait_until(move || state.realtime.subscriber_count(task_id) == 1).await;
    }

    state
        .realtime
        .broadcast(task_id, update(task_id, "alice", "ALI(01/01 10:00): hi"));

    let received = next_update(&mut socket).await;
    assert_eq!(received.task_id, task_id);
    assert_eq!(received.current_user, "alice");
    assert_eq!(received.thread[0].content, "ALI(01/01 10:00): hi");
}

#[tokio::test]
async fn test_reinit_retargets_the_connection() {
    let (addr, state) = spawn_server().await;
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    let mut socket = connect(addr, "bob").await;
    socket.send(init_frame(first)).await.unwrap();
    {
        let state = state.clone();
        wait_until(move || state.realtime.subscriber_count(first) == 1).await;
    }

    // Re-targeting tears down the first task's subscription entirely.
    socket.send(init_frame(second)).await.unwrap();
    {
        let state = state.clone();
        wait_until(move || {
            state.realtime.subscriber_count(second) == 1
                && state.realtime.subscriber_count(first) == 0
        })
        .await;
    }

    state
        .realtime
        .broadcast(first, update(first, "alice", "ALI(01/01 10:00): stale"));
    state
        .realtime
        .broadcast(second, update(second, "alice", "ALI(01/01 10:01): live"));

    let received = next_update(&mut socket).await;
    assert_eq!(received.task_id, second);
    assert_eq!(received.thread[0].content, "ALI(01/01 10:01): live");
}

#[tokio::test]
async fn test_disconnect_clears_presence() {
    let (addr, state) = spawn_server().await;

    let socket = connect(addr, "bob").await;
    {
        let state = state.clone();
        wait_until(move || state.realtime.presence().get("bob") == Some(&true)).await;
    }

    drop(socket);
    wait_until(move || state.realtime.presence().get("bob").is_none()).await;
}

#[tokio::test]
async fn test_upgrade_requires_user_param() {
    let (addr, _) = spawn_server().await;
    let result = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr)).await;
    assert!(result.is_err());
}
