//! Gateway wire format: JSON text frames `{"type": ..., "data": ...}`

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::dtmf::DtmfEvent;
use crate::domain::platform::PlatformEvent;
use crate::domain::shared::value_objects::ParticipantIdentity;
use crate::domain::speech::{AssistantProfile, Modality, Utterance};

/// Frames sent by the media bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InboundFrame {
    ParticipantConnected {
        identity: String,
    },
    SipDtmf {
        #[serde(default)]
        code: u32,
        #[serde(default)]
        digit: String,
        participant_identity: String,
    },
    Disconnected {
        #[serde(default)]
        reason: Option<String>,
    },
}

impl InboundFrame {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Convert to a platform event. Unknown key characters yield `None`.
    pub fn into_event(self) -> Option<PlatformEvent> {
        match self {
            InboundFrame::ParticipantConnected { identity } => Some(
                PlatformEvent::ParticipantConnected(ParticipantIdentity::new(identity)),
            ),
            InboundFrame::SipDtmf {
                code,
                digit,
                participant_identity,
            } => {
                let event = DtmfEvent::from_platform(
                    code,
                    &digit,
                    ParticipantIdentity::new(participant_identity),
                );
                if event.is_none() {
                    warn!("Dropping DTMF frame with unknown digit {:?} (code {})", digit, code);
                }
                event.map(PlatformEvent::Dtmf)
            }
            InboundFrame::Disconnected { reason } => Some(PlatformEvent::Disconnected(reason)),
        }
    }
}

/// Commands sent to the media bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OutboundCommand {
    StartAssistant {
        participant_identity: String,
        instructions: String,
        voice: String,
        modalities: Vec<Modality>,
        api_key: String,
    },
    Say {
        instruction: String,
        modalities: Vec<Modality>,
    },
    Leave,
}

impl OutboundCommand {
    pub fn start_assistant(participant: &ParticipantIdentity, profile: &AssistantProfile) -> Self {
        OutboundCommand::StartAssistant {
            participant_identity: participant.as_str().to_string(),
            instructions: profile.instructions.clone(),
            voice: profile.voice.clone(),
            modalities: profile.modalities.clone(),
            api_key: profile.api_key.clone(),
        }
    }

    pub fn say(utterance: &Utterance) -> Self {
        OutboundCommand::Say {
            instruction: utterance.instruction(),
            modalities: utterance.modalities().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dtmf::DtmfDigit;

    #[test]
    fn test_parse_dtmf_frame() {
        let frame = InboundFrame::parse(
            r#"{"type":"sip_dtmf","data":{"code":2,"digit":"2","participant_identity":"sip_caller"}}"#,
        )
        .unwrap();

        match frame.into_event() {
            Some(PlatformEvent::Dtmf(event)) => {
                assert_eq!(event.digit, DtmfDigit::Two);
                assert_eq!(event.participant.as_str(), "sip_caller");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_participant_and_disconnect() {
        let joined =
            InboundFrame::parse(r#"{"type":"participant_connected","data":{"identity":"sip_caller"}}"#)
                .unwrap();
        assert!(matches!(
            joined.into_event(),
            Some(PlatformEvent::ParticipantConnected(id)) if id.as_str() == "sip_caller"
        ));

        let gone = InboundFrame::parse(r#"{"type":"disconnected","data":{}}"#).unwrap();
        assert!(matches!(gone.into_event(), Some(PlatformEvent::Disconnected(None))));
    }

    #[test]
    fn test_unknown_digit_dropped() {
        let frame = InboundFrame::SipDtmf {
            code: 42,
            digit: "A".to_string(),
            participant_identity: "sip_caller".to_string(),
        };
        assert!(frame.into_event().is_none());

        let frame = InboundFrame::parse(
            r#"{"type":"sip_dtmf","data":{"code":1,"digit":"12","participant_identity":"sip_caller"}}"#,
        )
        .unwrap();
        assert!(frame.into_event().is_none());
    }

    #[test]
    fn test_malformed_frame() {
        assert!(InboundFrame::parse("not json").is_err());
        assert!(InboundFrame::parse(r#"{"type":"ringing","data":{}}"#).is_err());
    }

    #[test]
    fn test_say_command_is_voice_only() {
        let command = OutboundCommand::say(&Utterance::voice("Please hold."));
        let json = serde_json::to_value(&command).unwrap();

        assert_eq!(json["type"], "say");
        assert_eq!(
            json["data"]["instruction"],
            "Using your voice to respond, please say: Please hold."
        );
        assert_eq!(json["data"]["modalities"], serde_json::json!(["audio"]));
    }

    #[test]
    fn test_leave_command() {
        let json = serde_json::to_string(&OutboundCommand::Leave).unwrap();
        assert_eq!(json, r#"{"type":"leave"}"#);
    }
}
