//! Call session bounded context - one caller's interaction with the assistant

pub mod aggregate;
pub mod event;
pub mod guard;
pub mod value_object;

pub use aggregate::CallSession;
pub use event::SessionEvent;
pub use guard::ReleaseGuard;
pub use value_object::{EndReason, SessionState};
