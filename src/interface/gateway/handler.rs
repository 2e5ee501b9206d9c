//! WebSocket handler for gateway sessions

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::protocol::InboundFrame;
use super::session::GatewaySession;
use crate::application::listener::IncomingCall;
use crate::domain::platform::{PlatformEvent, SipTransferService};
use crate::domain::shared::value_objects::RoomName;

/// Shared state for gateway routes
#[derive(Clone)]
pub struct GatewayState {
    /// Hands new sessions to the call listener
    pub incoming: mpsc::Sender<IncomingCall>,
    pub transfers: Arc<dyn SipTransferService>,
}

/// WebSocket handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room): Path<String>,
    State(state): State<GatewayState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, RoomName::new(room), state))
}

/// Handle one gateway connection for its whole call
async fn handle_socket(socket: WebSocket, room: RoomName, state: GatewayState) {
    let (mut sender, mut receiver) = socket.split();
    let (session, event_tx, mut command_rx) =
        GatewaySession::new(room.clone(), Arc::clone(&state.transfers));

    if state
        .incoming
        .send(IncomingCall::new(Arc::new(session)))
        .await
        .is_err()
    {
        warn!("Call listener is not running; dropping session for room {}", room);
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    info!("Gateway connected for room {}", room);

    // Commands from the assistant to the bridge
    let mut send_task = tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            let leaving = matches!(command, super::protocol::OutboundCommand::Leave);
            match serde_json::to_string(&command) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        debug!("Failed to send command to gateway");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize command: {}", e);
                }
            }
            if leaving {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    });

    // Session events from the bridge to the assistant
    let frame_tx = event_tx.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match InboundFrame::parse(&text) {
                    Ok(frame) => {
                        if let Some(event) = frame.into_event() {
                            if frame_tx.send(event).await.is_err() {
                                debug!("Session no longer listening");
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Ignoring malformed gateway frame: {}", e);
                    }
                },
                Message::Close(_) => {
                    debug!("Received close message");
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => {}
                Message::Binary(_) => {
                    debug!("Received binary message (ignored)");
                }
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    // Covers a bridge that vanished without saying goodbye
    let _ = event_tx
        .send(PlatformEvent::Disconnected(Some(
            "gateway connection closed".to_string(),
        )))
        .await;

    info!("Gateway disconnected for room {}", room);
}
