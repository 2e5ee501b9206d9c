//! What the assistant says and how the speech model is set up

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output channel the speech model should answer on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Audio,
    Text,
}

/// One-shot prompt for the assistant to speak
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    text: String,
    modalities: Vec<Modality>,
}

impl Utterance {
    /// Utterance that must be answered with the voice, never as text
    pub fn voice(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            modalities: vec![Modality::Audio],
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn modalities(&self) -> &[Modality] {
        &self.modalities
    }

    pub fn is_voice(&self) -> bool {
        self.modalities == [Modality::Audio]
    }

    /// Instruction handed to the speech model.
    ///
    /// Text input makes the model reply in text unless told otherwise, which
    /// is useless on a phone line.
    pub fn instruction(&self) -> String {
        format!("Using your voice to respond, please say: {}", self.text)
    }
}

/// Speech model setup for one call
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantProfile {
    pub instructions: String,
    pub voice: String,
    pub modalities: Vec<Modality>,
    pub api_key: String,
}

impl fmt::Debug for AssistantProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantProfile")
            .field("instructions", &self.instructions)
            .field("voice", &self.voice)
            .field("modalities", &self.modalities)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
