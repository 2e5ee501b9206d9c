//! Per-process settings shared read-only by every call session

use std::time::Duration;

use super::prompts;
use crate::config::Config;
use crate::domain::directory::DepartmentDirectory;
use crate::domain::speech::{AssistantProfile, Modality};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Upper bound on waiting for the caller to connect
    pub join_timeout: Duration,
    pub transfer_delay: Duration,
    pub reprompt_unknown_digit: bool,
    pub greeting: String,
    pub profile: AssistantProfile,
}

impl SessionSettings {
    pub fn from_config(config: &Config, directory: &DepartmentDirectory) -> Self {
        Self {
            join_timeout: config.assistant.join_timeout,
            transfer_delay: config.assistant.transfer_delay,
            reprompt_unknown_digit: config.assistant.reprompt_unknown_digit,
            greeting: prompts::greeting(&config.assistant.company_name, directory),
            profile: AssistantProfile {
                instructions: prompts::instructions(directory),
                voice: config.model.voice.clone(),
                // Audio for the caller, text to feed the model context
                modalities: vec![Modality::Audio, Modality::Text],
                api_key: config.model.api_key.clone(),
            },
        }
    }
}
