// crates/server/src/routes/ws.rs
//! Realtime WebSocket endpoint.
//!
//! A client joins a student's channel by sending
//! `{"type":"join_student","student_id":"…"}` and then receives every
//! `status_update` published for that student. Channels are left when the
//! socket closes.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use focus_guard_core::{ClientMessage, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::realtime::Broadcaster;
use crate::state::AppState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let realtime = state.realtime.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, realtime))
}

fn encode<T: Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(error = %e, "Realtime reply skipped");
            None
        }
    }
}

/// Queue a reply for the socket. Frames that fail to encode are dropped.
fn reply(tx: &mpsc::UnboundedSender<String>, msg: &ServerMessage) {
    if let Some(text) = encode(msg) {
        let _ = tx.send(text);
    }
}

async fn handle_socket(socket: WebSocket, realtime: Broadcaster) {
    let (mut sink, mut stream) = socket.split();
    let connection_id = Uuid::new_v4();
    info!(%connection_id, "Client connected");

    // Everything bound for this socket goes through one queue.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let forward_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    let mut joined: HashSet<String> = HashSet::new();

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::JoinStudent { student_id }) if !student_id.trim().is_empty() => {
                    realtime.join(&student_id, connection_id, tx.clone());
                    info!(%connection_id, student_id = %student_id, "Student joined their channel");
                    reply(
                        &tx,
                        &ServerMessage::Joined {
                            student_id: student_id.clone(),
                        },
                    );
                    joined.insert(student_id);
                }
                Ok(ClientMessage::JoinStudent { .. }) => {
                    reply(
                        &tx,
                        &ServerMessage::Error {
                            message: "student_id must not be empty".to_string(),
                        },
                    );
                }
                Err(e) => {
                    warn!(%connection_id, error = %e, "Unrecognised realtime message");
                    reply(
                        &tx,
                        &ServerMessage::Error {
                            message: format!("invalid message: {e}"),
                        },
                    );
                }
            },
            Message::Ping(_) => {
                // Pong is handled automatically by axum
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    for student_id in &joined {
        realtime.unsubscribe(student_id, connection_id);
    }
    forward_task.abort();
    debug!(%connection_id, channels = joined.len(), "Left student channels");
    info!(%connection_id, "Client disconnected");
}
