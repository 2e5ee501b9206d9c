//! Domain event plumbing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::SessionId;

/// Something that happened to a call session
pub trait DomainEvent: Send + Sync {
    /// Dotted name, e.g. `session.ended`
    fn event_type(&self) -> &'static str;

    fn metadata(&self) -> &EventMetadata;

    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata().occurred_at
    }

    fn session_id(&self) -> SessionId {
        self.metadata().session_id
    }
}

/// Stamped onto every event when the aggregate records it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: Uuid,
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    pub fn for_session(session_id: SessionId) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            session_id,
            occurred_at: Utc::now(),
        }
    }
}
