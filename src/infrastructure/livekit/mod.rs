//! LiveKit server API integration

pub mod sip;
pub mod token;

pub use sip::{http_base_url, LiveKitSipClient};
pub use token::{AccessClaims, AccessTokenIssuer, SipGrant, VideoGrant};
