//! Session gateway - the media bridge's WebSocket link into the assistant
//!
//! Each socket opened on `/sessions/:room/ws` carries one call: the bridge
//! streams session events in, the assistant streams commands out.

pub mod handler;
pub mod protocol;
pub mod session;

pub use handler::{ws_handler, GatewayState};
pub use protocol::{InboundFrame, OutboundCommand};
pub use session::GatewaySession;
