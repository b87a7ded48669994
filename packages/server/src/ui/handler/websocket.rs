//! WebSocket connection handlers.
//!
//! Each connection runs two tasks: a reader that decodes frames and hands
//! commands to the dispatcher, and a pusher that drains the connection's
//! outbox into the socket. When either finishes the other is aborted and
//! the connection is unregistered.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use thiserror::Error;

use crate::{
    domain::{ConnectionId, Outbound, Outbox, OutboxReceiver},
    infrastructure::dto::websocket::{ChatEventDto, ProtocolError, decode_command},
    ui::state::AppState,
    usecase::DispatchError,
};

/// Close reason sent to every connection at shutdown.
const SHUTDOWN_REASON: &str = "Server shutting down";

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
) -> Response {
    if state.is_shutting_down() {
        tracing::info!("Refusing connection from {} during shutdown", remote);
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state, remote))
}

/// Why a connection's reader stopped.
#[derive(Debug, Error)]
enum ReaderExit {
    /// The client sent a close frame or the stream ended.
    #[error("closed by client ({})", close_summary(.0))]
    Closed(Option<CloseFrame>),

    #[error("transport error: {0}")]
    Transport(axum::Error),

    #[error("protocol error: {0}")]
    Protocol(ProtocolError),

    #[error("dispatch error: {0}")]
    Dispatch(DispatchError),
}

fn close_summary(frame: &Option<CloseFrame>) -> String {
    match frame {
        Some(frame) if frame.reason.as_str().is_empty() => format!("code {}", frame.code),
        Some(frame) => format!("code {}, reason '{}'", frame.code, frame.reason.as_str()),
        None => "no close frame".to_string(),
    }
}

impl ReaderExit {
    fn is_normal(&self) -> bool {
        match self {
            Self::Closed(None) => true,
            Self::Closed(Some(frame)) => {
                frame.code == close_code::NORMAL || frame.code == close_code::AWAY
            }
            _ => false,
        }
    }
}

/// Spawns a task that drains the outbox and pushes each entry to the WebSocket sender.
///
/// Events are written as JSON text frames. A close request ends the task
/// after writing the matching close frame.
fn pusher_loop(
    mut rx: OutboxReceiver,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let message = match outbound {
                Outbound::Event(event) => {
                    match serde_json::to_string(&ChatEventDto::from(event)) {
                        Ok(json) => Message::Text(json.into()),
                        Err(e) => {
                            tracing::warn!("Failed to encode chat event: {}", e);
                            continue;
                        }
                    }
                }
                Outbound::Close(reason) => {
                    let _ = sender.send(close_message(close_code::NORMAL, reason)).await;
                    break;
                }
                Outbound::Shutdown => {
                    let _ = sender
                        .send(close_message(close_code::AWAY, SHUTDOWN_REASON.to_string()))
                        .await;
                    break;
                }
            };
            if sender.send(message).await.is_err() {
                break;
            }
        }
    })
}

fn close_message(code: u16, reason: String) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}

/// Read frames until the client leaves or something goes wrong.
async fn reader_loop(
    state: &AppState,
    conn: ConnectionId,
    mut receiver: SplitStream<WebSocket>,
) -> ReaderExit {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => return ReaderExit::Transport(e),
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received text from {}: {}", conn, text.as_str());
                let command = match decode_command(text.as_str()) {
                    Ok(command) => command,
                    Err(e) => return ReaderExit::Protocol(e),
                };
                if let Err(e) = state.dispatch_command_usecase.execute(&conn, command).await {
                    return ReaderExit::Dispatch(e);
                }
            }
            Message::Binary(_) => return ReaderExit::Protocol(ProtocolError::BinaryFrame),
            Message::Ping(_) | Message::Pong(_) => {
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(frame) => return ReaderExit::Closed(frame),
        }
    }
    ReaderExit::Closed(None)
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, remote: SocketAddr) {
    let conn = ConnectionId::generate();
    let (outbox, rx) = Outbox::channel();

    match state
        .connect_user_usecase
        .execute(conn, Some(remote), outbox)
        .await
    {
        Ok(connected) => {
            tracing::info!(
                "Connected: {} as '{}' ({}), {} events replayed",
                remote,
                connected.nick,
                conn,
                connected.replayed
            );
        }
        Err(e) => {
            tracing::warn!("Failed to register connection from {}: {}", remote, e);
            return;
        }
    }

    let (sender, receiver) = socket.split();

    // Spawn a task to push queued events to this client
    let mut send_task = pusher_loop(rx, sender);

    // Spawn a task to receive commands from this client
    let state_clone = state.clone();
    let mut recv_task =
        tokio::spawn(async move { reader_loop(&state_clone, conn, receiver).await });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        exit = &mut recv_task => {
            send_task.abort();
            match exit {
                Ok(exit) if exit.is_normal() => {
                    tracing::info!("Disconnected: {} ({})", remote, exit);
                }
                Ok(exit) => {
                    tracing::warn!("Connection from {} failed: {}", remote, exit);
                }
                Err(e) => {
                    tracing::warn!("Reader for {} panicked or was cancelled: {}", remote, e);
                }
            }
        }
        _ = &mut send_task => {
            recv_task.abort();
            tracing::info!("Closed by server: {}", remote);
        }
    };

    if state.disconnect_user_usecase.execute(&conn).await.is_none() {
        tracing::debug!("Connection {} was already unregistered", conn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegistryError;

    #[test]
    fn test_reader_exit_display_names_the_cause() {
        // テスト項目: 切断理由のログ表示に原因の詳細が含まれる
        // given (前提条件):
        let conn = ConnectionId::generate();
        let kicked = ReaderExit::Closed(Some(CloseFrame {
            code: close_code::NORMAL,
            reason: "bye".into(),
        }));
        let protocol = ReaderExit::Protocol(ProtocolError::BinaryFrame);
        let dispatch = ReaderExit::Dispatch(DispatchError::Registry(
            RegistryError::UnknownConnection(conn),
        ));

        // when (操作) / then (期待する結果):
        assert_eq!(
            kicked.to_string(),
            format!("closed by client (code {}, reason 'bye')", close_code::NORMAL)
        );
        assert_eq!(
            ReaderExit::Closed(None).to_string(),
            "closed by client (no close frame)"
        );
        assert_eq!(
            protocol.to_string(),
            "protocol error: binary frames are not supported"
        );
        assert!(dispatch.to_string().contains(&conn.to_string()));
    }

    #[test]
    fn test_only_client_close_is_normal() {
        // given (前提条件):
        let away = ReaderExit::Closed(Some(CloseFrame {
            code: close_code::AWAY,
            reason: "".into(),
        }));
        let error = ReaderExit::Closed(Some(CloseFrame {
            code: close_code::ERROR,
            reason: "".into(),
        }));

        // when (操作) / then (期待する結果):
        assert!(ReaderExit::Closed(None).is_normal());
        assert!(away.is_normal());
        assert!(!error.is_normal());
        assert!(!ReaderExit::Protocol(ProtocolError::BinaryFrame).is_normal());
    }
}
