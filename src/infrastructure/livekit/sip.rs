/// LiveKit SIP service client (call transfer via SIP REFER)
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::token::AccessTokenIssuer;
use crate::config::LiveKitConfig;
use crate::domain::platform::{SipTransferService, TransferRequest};
use crate::domain::shared::error::CallError;
use crate::domain::shared::result::Result;

const TRANSFER_PATH: &str = "/twirp/livekit.SIP/TransferSIPParticipant";

/// Request body of `TransferSIPParticipant`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSipParticipantBody {
    pub participant_identity: String,
    pub room_name: String,
    pub transfer_to: String,
    pub play_dialtone: bool,
}

impl From<&TransferRequest> for TransferSipParticipantBody {
    fn from(request: &TransferRequest) -> Self {
        Self {
            participant_identity: request.participant_identity.as_str().to_string(),
            room_name: request.room_name.as_str().to_string(),
            transfer_to: request.transfer_to.clone(),
            play_dialtone: request.play_dialtone,
        }
    }
}

/// Twirp error payload
#[derive(Debug, Deserialize)]
struct TwirpError {
    code: String,
    msg: String,
}

/// HTTP base for the server API: `wss://host` → `https://host`
pub fn http_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if let Some(rest) = trimmed.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if let Some(rest) = trimmed.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else {
        trimmed.to_string()
    }
}

pub struct LiveKitSipClient {
    http: reqwest::Client,
    base_url: String,
    tokens: AccessTokenIssuer,
}

impl LiveKitSipClient {
    pub fn new(url: &str, api_key: &str, api_secret: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CallError::Configuration(format!("cannot build HTTP client: {}", e)))?;

        let base_url = http_base_url(url);
        debug!("Initializing LiveKit API client with URL: {}", base_url);

        Ok(Self {
            http,
            base_url,
            tokens: AccessTokenIssuer::new(api_key, api_secret),
        })
    }

    pub fn from_config(config: &LiveKitConfig) -> Result<Self> {
        Self::new(
            &config.url,
            &config.api_key,
            &config.api_secret,
            config.request_timeout,
        )
    }

    pub fn transfer_url(&self) -> String {
        format!("{}{}", self.base_url, TRANSFER_PATH)
    }
}

#[async_trait]
impl SipTransferService for LiveKitSipClient {
    async fn transfer_participant(&self, request: &TransferRequest) -> Result<()> {
        let token = self.tokens.sip_transfer_token(request.room_name.as_str())?;
        let body = TransferSipParticipantBody::from(request);
        debug!("Transfer request: {:?}", body);

        let response = self
            .http
            .post(self.transfer_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::Transfer(format!("request to LiveKit failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            info!(
                "LiveKit accepted transfer of {} to {}",
                body.participant_identity, body.transfer_to
            );
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<TwirpError>(&text) {
            Ok(err) => format!("{} ({}): {}", status.as_u16(), err.code, err.msg),
            Err(_) => format!("{}: {}", status.as_u16(), text),
        };
        warn!("LiveKit rejected transfer: {}", message);
        Err(CallError::Transfer(message))
    }
}
