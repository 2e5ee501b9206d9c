//! Application layer - Use cases and application services
//!
//! This layer orchestrates the call session:
//! - Joining a session and greeting the caller
//! - Turning key presses into transfers
//! - Running every call in isolation from the others

pub mod controller;
pub mod listener;
pub mod prompts;
pub mod settings;

pub use controller::{CallSessionController, DigitOutcome, IgnoreReason};
pub use listener::{CallListener, IncomingCall, ListenerStats};
pub use settings::SessionSettings;
