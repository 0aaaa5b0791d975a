use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::types::{ClientMessage, ServerMessage};
use crate::websocket::RoomManager;
use crate::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let client_id = state.room_manager.register(tx);
    info!("WebSocket client connected: {}", client_id);

    // Forward queued messages (pair updates, replies) to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    let snapshot = state.market.snapshot();
    send_message(
        &state.room_manager,
        client_id,
        &ServerMessage::MarketStatus {
            running: state.market.is_running(),
            tick: snapshot.tick,
        },
    );

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                debug!("Received message from {}: {}", client_id, text);
                handle_message(&state.room_manager, client_id, &text);
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket client disconnecting: {}", client_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    state.room_manager.unregister(client_id);
    send_task.abort();
    info!("WebSocket client disconnected: {}", client_id);
}

/// Apply one client message and queue the reply.
pub fn handle_message(rooms: &RoomManager, client_id: Uuid, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            send_message(
                rooms,
                client_id,
                &ServerMessage::Error {
                    error: format!("Invalid message: {}", e),
                },
            );
            return;
        }
    };

    let reply = match msg {
        ClientMessage::Subscribe { pairs } => {
            let subscribed = rooms.subscribe(client_id, &pairs);
            debug!("Client {} subscribed to: {:?}", client_id, subscribed);
            ServerMessage::Subscribed { pairs: subscribed }
        }
        ClientMessage::Unsubscribe { pairs } => {
            let unsubscribed = rooms.unsubscribe(client_id, &pairs);
            debug!("Client {} unsubscribed from: {:?}", client_id, unsubscribed);
            ServerMessage::Unsubscribed {
                pairs: unsubscribed,
            }
        }
    };

    send_message(rooms, client_id, &reply);
}

fn send_message(rooms: &RoomManager, client_id: Uuid, msg: &ServerMessage) {
    if let Ok(json) = serde_json::to_string(msg) {
        rooms.send_to(client_id, &json);
    }
}
