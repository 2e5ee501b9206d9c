//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - External service integrations (LiveKit server API)

pub mod livekit;
