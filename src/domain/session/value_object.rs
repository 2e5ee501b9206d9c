//! Call session value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Call session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for the caller's participant to connect
    Connecting,
    /// Greeting has been issued
    Greeted,
    /// Waiting for key presses or speech
    ListeningForInput,
    /// A transfer has been started and not yet resolved
    TransferPending,
    /// Terminal
    Ended(EndReason),
}

impl SessionState {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, new_state: &SessionState) -> bool {
        use SessionState::*;

        match (self, new_state) {
            (Connecting, Greeted) => true,
            (Greeted, ListeningForInput) => true,
            (ListeningForInput, TransferPending) => true,
            // Only a failed transfer goes back
            (TransferPending, ListeningForInput) => true,

            (Ended(_), _) => false,
            (_, Ended(_)) => true,

            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Ended(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Connecting => "connecting",
            SessionState::Greeted => "greeted",
            SessionState::ListeningForInput => "listening_for_input",
            SessionState::TransferPending => "transfer_pending",
            SessionState::Ended(_) => "ended",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reason for a session ending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The platform accepted the transfer and the caller left
    Transferred,
    /// The platform reported the session disconnected
    CallerDisconnected,
    /// The process is shutting down
    Shutdown,
    /// Unrecoverable error
    Failed(String),
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Transferred => f.write_str("transferred"),
            EndReason::CallerDisconnected => f.write_str("caller disconnected"),
            EndReason::Shutdown => f.write_str("shutdown"),
            EndReason::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_state_transitions() {
        use SessionState::*;

        assert!(Connecting.can_transition_to(&Greeted));
        assert!(Greeted.can_transition_to(&ListeningForInput));
        assert!(ListeningForInput.can_transition_to(&TransferPending));
        assert!(TransferPending.can_transition_to(&ListeningForInput));

        // Any live state can end
        for state in [Connecting, Greeted, ListeningForInput, TransferPending] {
            assert!(state.can_transition_to(&Ended(EndReason::CallerDisconnected)));
        }
    }

    #[test]
    fn test_invalid_state_transitions() {
        use SessionState::*;

        assert!(!Connecting.can_transition_to(&TransferPending));
        assert!(!Greeted.can_transition_to(&TransferPending));
        assert!(!ListeningForInput.can_transition_to(&Greeted));

        let ended = Ended(EndReason::Transferred);
        assert!(!ended.can_transition_to(&ListeningForInput));
        assert!(!ended.can_transition_to(&Ended(EndReason::Shutdown)));
    }

    #[test]
    fn test_is_active() {
        assert!(SessionState::Connecting.is_active());
        assert!(SessionState::TransferPending.is_active());
        assert!(!SessionState::Ended(EndReason::Shutdown).is_active());
    }
}
