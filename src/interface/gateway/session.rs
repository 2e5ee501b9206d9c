//! Session platform adapter backed by a gateway socket

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use super::protocol::OutboundCommand;
use crate::domain::platform::{
    PlatformEvent, PlatformEvents, SessionPlatform, SipTransferService, TransferRequest,
};
use crate::domain::shared::error::CallError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{ParticipantIdentity, RoomName};
use crate::domain::speech::{AssistantProfile, Utterance};

/// Queue depth for events and commands of one call
pub const CHANNEL_CAPACITY: usize = 64;

/// One call carried over a gateway socket.
///
/// Events come from the socket reader, commands go to the socket writer,
/// and transfers go straight to the platform's SIP API.
pub struct GatewaySession {
    room: RoomName,
    events: Mutex<Option<PlatformEvents>>,
    commands: mpsc::Sender<OutboundCommand>,
    transfers: Arc<dyn SipTransferService>,
}

impl GatewaySession {
    /// Returns the session plus the socket-side ends of its channels
    pub fn new(
        room: RoomName,
        transfers: Arc<dyn SipTransferService>,
    ) -> (
        Self,
        mpsc::Sender<PlatformEvent>,
        mpsc::Receiver<OutboundCommand>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let session = Self {
            room,
            events: Mutex::new(Some(event_rx)),
            commands: command_tx,
            transfers,
        };
        (session, event_tx, command_rx)
    }

    async fn send(&self, command: OutboundCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CallError::Platform(format!("gateway link for {} is closed", self.room)))
    }
}

#[async_trait]
impl SessionPlatform for GatewaySession {
    fn room_name(&self) -> RoomName {
        self.room.clone()
    }

    async fn connect(&self) -> Result<PlatformEvents> {
        self.events
            .lock()
            .await
            .take()
            .ok_or_else(|| CallError::Connection(format!("session {} already connected", self.room)))
    }

    async fn start_assistant(
        &self,
        participant: &ParticipantIdentity,
        profile: &AssistantProfile,
    ) -> Result<()> {
        self.send(OutboundCommand::start_assistant(participant, profile))
            .await
    }

    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        self.send(OutboundCommand::say(utterance)).await
    }

    async fn transfer_participant(&self, request: &TransferRequest) -> Result<()> {
        self.transfers.transfer_participant(request).await
    }

    async fn disconnect(&self) -> Result<()> {
        // Never blocks, even when the bridge has stopped reading
        match self.commands.try_send(OutboundCommand::Leave) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Gateway link for {} is backed up, dropping leave command", self.room);
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Gateway link for {} already closed", self.room);
            }
        }
        Ok(())
    }
}
