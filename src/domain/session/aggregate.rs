//! Call session aggregate root

use crate::domain::dtmf::DtmfDigit;
use crate::domain::session::event::SessionEvent;
use crate::domain::session::value_object::{EndReason, SessionState};
use crate::domain::shared::error::CallError;
use crate::domain::shared::events::EventMetadata;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{ParticipantIdentity, RoomName, SessionId};
use chrono::{DateTime, Utc};

/// Call session aggregate root
///
/// Enforces the session lifecycle: the participant is bound once, at most
/// one transfer is in flight, and `Ended` is terminal.
#[derive(Debug, Clone)]
pub struct CallSession {
    id: SessionId,
    room: RoomName,
    /// Caller identity, bound once the participant connects
    participant: Option<ParticipantIdentity>,
    state: SessionState,
    transfer_in_progress: bool,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    /// Pending domain events
    events: Vec<SessionEvent>,
}

impl CallSession {
    /// Create a session for a newly detected call
    pub fn new(room: RoomName) -> Self {
        Self {
            id: SessionId::new(),
            room,
            participant: None,
            state: SessionState::Connecting,
            transfer_in_progress: false,
            started_at: Utc::now(),
            ended_at: None,
            events: Vec::new(),
        }
    }

    /// Bind the caller's identity. Fails if one is already bound.
    pub fn bind_participant(&mut self, participant: ParticipantIdentity) -> Result<()> {
        if let Some(existing) = &self.participant {
            return Err(CallError::Validation(format!(
                "participant already bound to {}",
                existing
            )));
        }
        if self.state != SessionState::Connecting {
            return Err(CallError::InvalidStateTransition(format!(
                "cannot bind participant in state {}",
                self.state
            )));
        }

        self.participant = Some(participant.clone());
        self.record_event(SessionEvent::ParticipantBound {
            meta: self.stamp(),
            participant,
        });
        Ok(())
    }

    /// Record that the greeting was issued and start listening
    pub fn greeted(&mut self) -> Result<()> {
        self.transition_to(SessionState::Greeted)?;
        self.record_event(SessionEvent::Greeted {
            meta: self.stamp(),
        });
        self.transition_to(SessionState::ListeningForInput)
    }

    /// Check-and-set the transfer flag
    pub fn begin_transfer(
        &mut self,
        digit: DtmfDigit,
        department: &str,
        destination: &str,
    ) -> Result<()> {
        if self.transfer_in_progress {
            return Err(CallError::InvalidStateTransition(
                "transfer already in progress".to_string(),
            ));
        }
        self.transition_to(SessionState::TransferPending)?;
        self.transfer_in_progress = true;

        self.record_event(SessionEvent::TransferRequested {
            meta: self.stamp(),
            digit,
            department: department.to_string(),
            destination: destination.to_string(),
        });
        Ok(())
    }

    /// Clear the transfer flag so the caller can try again
    pub fn transfer_failed(&mut self, reason: &str) -> Result<()> {
        if !matches!(self.state, SessionState::TransferPending) {
            return Err(CallError::InvalidStateTransition(
                "no transfer pending".to_string(),
            ));
        }
        self.transition_to(SessionState::ListeningForInput)?;
        self.transfer_in_progress = false;

        self.record_event(SessionEvent::TransferFailed {
            meta: self.stamp(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// End the session
    pub fn end(&mut self, reason: EndReason) -> Result<()> {
        self.transition_to(SessionState::Ended(reason.clone()))?;
        self.transfer_in_progress = false;
        self.ended_at = Some(Utc::now());

        self.record_event(SessionEvent::Ended {
            meta: self.stamp(),
            reason,
        });
        Ok(())
    }

    fn transition_to(&mut self, new_state: SessionState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(CallError::InvalidStateTransition(format!(
                "Cannot transition from {:?} to {:?}",
                self.state, new_state
            )));
        }

        self.state = new_state;
        Ok(())
    }

    fn stamp(&self) -> EventMetadata {
        EventMetadata::for_session(self.id)
    }

    fn record_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // Getters
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn room(&self) -> &RoomName {
        &self.room
    }

    pub fn participant(&self) -> Option<&ParticipantIdentity> {
        self.participant.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_transfer_in_progress(&self) -> bool {
        self.transfer_in_progress
    }

    pub fn started_at(&self) -> &DateTime<Utc> {
        &self.started_at
    }

    pub fn ended_at(&self) -> Option<&DateTime<Utc>> {
        self.ended_at.as_ref()
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.ended_at.map(|ended| ended - self.started_at)
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
