//! Session platform port
//!
//! The controller only talks to the real-time platform through these
//! traits. Adapters live in the infrastructure and interface layers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::dtmf::DtmfEvent;
use super::shared::result::Result;
use super::shared::value_objects::{ParticipantIdentity, RoomName};
use super::speech::{AssistantProfile, Utterance};

/// Something the platform reports about the session
#[derive(Debug, Clone)]
pub enum PlatformEvent {
    /// The caller's participant finished connecting
    ParticipantConnected(ParticipantIdentity),
    /// The caller pressed a key
    Dtmf(DtmfEvent),
    /// The session is gone
    Disconnected(Option<String>),
}

/// Ordered per-session event queue
pub type PlatformEvents = mpsc::Receiver<PlatformEvent>;

/// SIP REFER request for one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub participant_identity: ParticipantIdentity,
    pub room_name: RoomName,
    /// `tel:` or `sip:` URI
    pub transfer_to: String,
    pub play_dialtone: bool,
}

/// Real-time session platform as seen by one call
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionPlatform: Send + Sync {
    /// Room hosting the call
    fn room_name(&self) -> RoomName;

    /// Attach to the session. Returns the event queue; may only be taken once.
    async fn connect(&self) -> Result<PlatformEvents>;

    /// Start the speech model for `participant`
    async fn start_assistant(
        &self,
        participant: &ParticipantIdentity,
        profile: &AssistantProfile,
    ) -> Result<()>;

    /// Have the assistant speak
    async fn speak(&self, utterance: &Utterance) -> Result<()>;

    /// Redirect the participant's call. The participant leaves the session on success.
    async fn transfer_participant(&self, request: &TransferRequest) -> Result<()>;

    /// Leave the session and stop event delivery
    async fn disconnect(&self) -> Result<()>;
}

/// Platform API that performs the SIP REFER
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SipTransferService: Send + Sync {
    async fn transfer_participant(&self, request: &TransferRequest) -> Result<()>;
}
