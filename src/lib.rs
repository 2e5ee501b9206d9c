//! Switchboard - a phone assistant that routes callers to departments
//!
//! Answers calls delivered by a real-time session platform, greets the
//! caller with a department menu and transfers the call with a SIP REFER
//! when the caller presses a key.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::CallError;
pub use domain::shared::result::Result;
