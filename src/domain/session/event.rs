//! Call session domain events

use serde::{Deserialize, Serialize};

use crate::domain::dtmf::DtmfDigit;
use crate::domain::session::value_object::EndReason;
use crate::domain::shared::events::{DomainEvent, EventMetadata};
use crate::domain::shared::value_objects::ParticipantIdentity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    ParticipantBound {
        meta: EventMetadata,
        participant: ParticipantIdentity,
    },
    Greeted {
        meta: EventMetadata,
    },
    TransferRequested {
        meta: EventMetadata,
        digit: DtmfDigit,
        department: String,
        destination: String,
    },
    TransferFailed {
        meta: EventMetadata,
        reason: String,
    },
    Ended {
        meta: EventMetadata,
        reason: EndReason,
    },
}

impl SessionEvent {
    /// One-line summary for the session log
    pub fn describe(&self) -> String {
        match self {
            SessionEvent::ParticipantBound { participant, .. } => {
                format!("participant {} bound", participant)
            }
            SessionEvent::Greeted { .. } => "caller greeted".to_string(),
            SessionEvent::TransferRequested {
                digit,
                department,
                destination,
                ..
            } => format!("digit {} -> {} at {}", digit, department, destination),
            SessionEvent::TransferFailed { reason, .. } => format!("transfer failed: {}", reason),
            SessionEvent::Ended { reason, .. } => format!("ended: {}", reason),
        }
    }
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::ParticipantBound { .. } => "session.participant_bound",
            SessionEvent::Greeted { .. } => "session.greeted",
            SessionEvent::TransferRequested { .. } => "session.transfer_requested",
            SessionEvent::TransferFailed { .. } => "session.transfer_failed",
            SessionEvent::Ended { .. } => "session.ended",
        }
    }

    fn metadata(&self) -> &EventMetadata {
        match self {
            SessionEvent::ParticipantBound { meta, .. }
            | SessionEvent::Greeted { meta }
            | SessionEvent::TransferRequested { meta, .. }
            | SessionEvent::TransferFailed { meta, .. }
            | SessionEvent::Ended { meta, .. } => meta,
        }
    }
}
