//! Domain layer - Core call-handling rules
//!
//! This layer contains:
//! - The call session aggregate and its lifecycle
//! - Value objects (digits, numbers, identities)
//! - The department directory
//! - Ports for the session platform

pub mod directory;
pub mod dtmf;
pub mod platform;
pub mod session;
pub mod shared;
pub mod speech;

// Re-export commonly used types
pub use shared::{CallError, Result};
