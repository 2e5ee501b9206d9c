//! Interface layer - External interfaces
//!
//! This layer handles:
//! - The session gateway WebSocket
//! - Health and metrics endpoints

pub mod api;
pub mod gateway;
