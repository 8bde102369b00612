//! End-to-end WebSocket tests against a bound listener.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use chat_hub::api;
use chat_hub::app_state::AppState;
use chat_hub::config::HubConfig;
use chat_hub::domain::{Audience, Envelope};
use chat_hub::hub::{Hub, HubHandle, HubStats};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve() -> (SocketAddr, HubHandle) {
    serve_with(&HubConfig::default()).await
}

async fn serve_with(config: &HubConfig) -> (SocketAddr, HubHandle) {
    let (hub, _task) = HubHandle::spawn(Arc::new(Hub::new()), 16);
    let app = api::app(AppState::new(hub.clone(), config));
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, hub)
}

async fn open(addr: SocketAddr, user: uuid::Uuid) -> Client {
    let url = format!("ws://{addr}/ws?user_id={user}");
    let Ok((client, _)) = tokio_tungstenite::connect_async(url).await else {
        panic!("ws connect failed");
    };
    client
}

async fn next_json(client: &mut Client) -> serde_json::Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next()).await;
        let Ok(Some(Ok(frame))) = frame else {
            panic!("no frame received");
        };
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap_or_default();
        }
    }
}

async fn wait_for_empty_hub(hub: &HubHandle, attempts: usize) -> HubStats {
    let mut stats = hub.stats().await;
    for _ in 0..attempts {
        if stats.connections == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        stats = hub.stats().await;
    }
    stats
}

async fn send_json(client: &mut Client, value: serde_json::Value) {
    let Ok(()) = client.send(Message::text(value.to_string())).await else {
        panic!("ws send failed");
    };
}

#[tokio::test]
async fn joined_client_receives_room_broadcast() {
    let (addr, hub) = serve().await;
    let channel = uuid::Uuid::new_v4();
    let mut client = open(addr, uuid::Uuid::new_v4()).await;

    send_json(
        &mut client,
        serde_json::json!({
            "id": "j1",
            "command": "join",
            "scope": "channel",
            "room_id": channel,
        }),
    )
    .await;
    let reply = next_json(&mut client).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["id"], "j1");
    assert_eq!(reply["payload"]["joined"], format!("channel:{channel}"));

    let envelope = Envelope::new(
        Audience::Channel(channel),
        "message.created",
        serde_json::json!({ "text": "hi" }),
    );
    let Ok(report) = hub.dispatch(envelope).await else {
        panic!("dispatch failed");
    };
    assert_eq!(report.delivered, 1);

    let event = next_json(&mut client).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["event"], "message.created");
    assert_eq!(event["payload"]["data"]["text"], "hi");
}

#[tokio::test]
async fn ping_command_gets_pong() {
    let (addr, _hub) = serve().await;
    let mut client = open(addr, uuid::Uuid::new_v4()).await;

    send_json(&mut client, serde_json::json!({ "id": "p", "command": "ping" })).await;
    let reply = next_json(&mut client).await;
    assert_eq!(reply["payload"]["pong"], true);
}

#[tokio::test]
async fn disconnect_unregisters_connection() {
    let (addr, hub) = serve().await;
    let channel = uuid::Uuid::new_v4();
    let mut client = open(addr, uuid::Uuid::new_v4()).await;
    send_json(
        &mut client,
        serde_json::json!({ "command": "join", "scope": "channel", "room_id": channel }),
    )
    .await;
    let _ = next_json(&mut client).await;
    assert_eq!(hub.stats().await.connections, 1);

    let _ = client.close(None).await;
    drop(client);

    let stats = wait_for_empty_hub(&hub, 50).await;
    assert_eq!(stats.connections, 0);
    assert_eq!(stats.rooms, 0);
}

#[tokio::test]
async fn silent_client_is_closed_after_idle_timeout() {
    let config = HubConfig {
        ping_interval: Duration::from_secs(1),
        idle_timeout: Duration::from_secs(1),
        ..HubConfig::default()
    };
    let (addr, hub) = serve_with(&config).await;
    let workspace = uuid::Uuid::new_v4();
    let mut client = open(addr, uuid::Uuid::new_v4()).await;
    send_json(
        &mut client,
        serde_json::json!({ "command": "join", "scope": "workspace", "room_id": workspace }),
    )
    .await;
    let _ = next_json(&mut client).await;
    assert_eq!(hub.stats().await.rooms, 1);

    // The client stays open but stops reading, so server pings go unanswered.
    let stats = wait_for_empty_hub(&hub, 250).await;
    assert_eq!(stats.connections, 0);
    assert_eq!(stats.rooms, 0);
    assert_eq!(stats.users, 0);
    drop(client);
}
