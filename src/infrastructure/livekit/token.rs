/// Access tokens for the LiveKit server API
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::shared::error::CallError;
use crate::domain::shared::result::Result;

/// Room permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room: String,
    pub room_admin: bool,
}

/// SIP permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SipGrant {
    pub admin: bool,
    pub call: bool,
}

/// JWT claims understood by the LiveKit server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String,
    pub sub: String,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
    pub video: VideoGrant,
    pub sip: SipGrant,
}

/// Signs short-lived HS256 tokens with the API key and secret
pub struct AccessTokenIssuer {
    api_key: String,
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl AccessTokenIssuer {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            encoding_key: EncodingKey::from_secret(api_secret.as_bytes()),
            ttl: Duration::from_secs(600),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Claims allowing a SIP transfer inside `room`
    pub fn sip_transfer_claims(&self, room: &str) -> AccessClaims {
        let now = Utc::now().timestamp();
        AccessClaims {
            iss: self.api_key.clone(),
            sub: self.api_key.clone(),
            nbf: now,
            exp: now + self.ttl.as_secs() as i64,
            jti: Uuid::new_v4().to_string(),
            video: VideoGrant {
                room: room.to_string(),
                room_admin: true,
            },
            sip: SipGrant {
                admin: false,
                call: true,
            },
        }
    }

    pub fn sip_transfer_token(&self, room: &str) -> Result<String> {
        encode(&Header::default(), &self.sip_transfer_claims(room), &self.encoding_key)
            .map_err(|e| CallError::Configuration(format!("cannot sign access token: {}", e)))
    }
}
