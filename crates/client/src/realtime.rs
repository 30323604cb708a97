// crates/client/src/realtime.rs
//! Realtime status channel: joins the student's room and forwards every
//! `status_update` into the focus monitor.

use std::time::Duration;

use focus_guard_core::{ClientMessage, ServerMessage, StatusUpdate};
use futures_util::{SinkExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::monitor::MonitorHandle;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// A server frame the monitor has to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    /// The channel is live. Pushes published before this were missed.
    Joined,
    Update(StatusUpdate),
}

/// Decode one server frame.
pub fn parse_server_message(text: &str) -> Result<Option<RealtimeEvent>, ClientError> {
    match serde_json::from_str::<ServerMessage>(text)? {
        ServerMessage::StatusUpdate(update) => Ok(Some(RealtimeEvent::Update(update))),
        ServerMessage::Joined { student_id } => {
            debug!(student_id = %student_id, "Joined realtime channel");
            Ok(Some(RealtimeEvent::Joined))
        }
        ServerMessage::Error { message } => {
            warn!(message = %message, "Realtime server reported an error");
            Ok(None)
        }
    }
}

/// Spawn the realtime subscriber. It reconnects with exponential backoff and
/// exits once the monitor has shut down.
pub fn spawn_realtime(
    ws_url: String,
    student_id: String,
    monitor: MonitorHandle,
    max_reconnect_delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(%ws_url, student_id = %student_id, "Realtime client starting");
        let mut backoff = INITIAL_BACKOFF;

        loop {
            match connect_and_listen(&ws_url, &student_id, &monitor).await {
                Ok(()) => {
                    debug!("Realtime connection closed");
                    backoff = INITIAL_BACKOFF;
                }
                Err(e) => {
                    warn!(backoff_secs = backoff.as_secs(), error = %e, "Realtime connection failed");
                }
            }
            if monitor.is_closed() {
                break;
            }

            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(max_reconnect_delay);
        }
        info!("Realtime client stopped");
    })
}

async fn connect_and_listen(
    ws_url: &str,
    student_id: &str,
    monitor: &MonitorHandle,
) -> Result<(), ClientError> {
    let (ws_stream, _) = connect_async(ws_url).await?;
    let (mut sink, mut stream) = ws_stream.split();

    let join = serde_json::to_string(&ClientMessage::JoinStudent {
        student_id: student_id.to_string(),
    })?;
    sink.send(Message::Text(join.into())).await?;

    while let Some(frame) = stream.next().await {
        match frame? {
            Message::Text(text) => {
                let forwarded = match parse_server_message(text.as_str()) {
                    Ok(Some(RealtimeEvent::Joined)) => monitor.resync(),
                    Ok(Some(RealtimeEvent::Update(update))) => monitor.apply_push(update),
                    Ok(None) => Ok(()),
                    Err(e) => {
                        warn!(error = %e, "Ignoring malformed realtime message");
                        continue;
                    }
                };
                if forwarded.is_err() {
                    let _ = sink.close().await;
                    return Ok(());
                }
            }
            Message::Close(_) => return Ok(()),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_guard_core::StudentStatus;

    #[test]
    fn test_parse_status_update() {
        let event = parse_server_message(r#"{"type":"status_update","status":"needs_intervention"}"#)
            .unwrap();
        assert_eq!(
            event,
            Some(RealtimeEvent::Update(StatusUpdate {
                status: StudentStatus::NeedsIntervention,
                intervention: None,
            }))
        );
    }

    #[test]
    fn test_parse_join_ack_and_errors() {
        assert_eq!(
            parse_server_message(r#"{"type":"joined","student_id":"student 123"}"#).unwrap(),
            Some(RealtimeEvent::Joined)
        );
        assert_eq!(
            parse_server_message(r#"{"type":"error","message":"bad"}"#).unwrap(),
            None
        );
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(matches!(
            parse_server_message(r#"{"type":"shout"}"#),
            Err(ClientError::Decode(_))
        ));
    }
}
