//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use switchboard::application::SessionSettings;
use switchboard::domain::directory::{standard_entries, DepartmentDirectory};
use switchboard::domain::platform::{
    PlatformEvent, PlatformEvents, SessionPlatform, TransferRequest,
};
use switchboard::domain::shared::value_objects::{ParticipantIdentity, RoomName};
use switchboard::domain::speech::{AssistantProfile, Modality, Utterance};
use switchboard::{CallError, Result};
use tokio::sync::mpsc;

/// In-memory platform that records everything the controller asks of it
pub struct RecordingPlatform {
    room: RoomName,
    events: Mutex<Option<PlatformEvents>>,
    fail_transfers: usize,
    stall_speech: bool,
    pub spoken: Mutex<Vec<String>>,
    pub transfers: Mutex<Vec<TransferRequest>>,
    pub assistant_starts: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl RecordingPlatform {
    pub fn new(room: &str) -> (Arc<Self>, mpsc::Sender<PlatformEvent>) {
        Self::failing_first(room, 0)
    }

    /// The first `failures` transfers are rejected with a SIP error
    pub fn failing_first(room: &str, failures: usize) -> (Arc<Self>, mpsc::Sender<PlatformEvent>) {
        Self::build(room, failures, false)
    }

    /// Every `speak` is recorded and then never completes
    pub fn with_stalled_speech(room: &str) -> (Arc<Self>, mpsc::Sender<PlatformEvent>) {
        Self::build(room, 0, true)
    }

    fn build(
        room: &str,
        failures: usize,
        stall_speech: bool,
    ) -> (Arc<Self>, mpsc::Sender<PlatformEvent>) {
        let (tx, rx) = mpsc::channel(32);
        let platform = Self {
            room: RoomName::new(room),
            events: Mutex::new(Some(rx)),
            fail_transfers: failures,
            stall_speech,
            spoken: Mutex::new(Vec::new()),
            transfers: Mutex::new(Vec::new()),
            assistant_starts: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        };
        (Arc::new(platform), tx)
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.lock().unwrap().len()
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn spoke(&self, fragment: &str) -> bool {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .any(|text| text.contains(fragment))
    }
}

#[async_trait]
impl SessionPlatform for RecordingPlatform {
    fn room_name(&self) -> RoomName {
        self.room.clone()
    }

    async fn connect(&self) -> Result<PlatformEvents> {
        self.events
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| CallError::Connection("already connected".to_string()))
    }

    async fn start_assistant(
        &self,
        _participant: &ParticipantIdentity,
        _profile: &AssistantProfile,
    ) -> Result<()> {
        self.assistant_starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn speak(&self, utterance: &Utterance) -> Result<()> {
        self.spoken.lock().unwrap().push(utterance.text().to_string());
        if self.stall_speech {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn transfer_participant(&self, request: &TransferRequest) -> Result<()> {
        let mut transfers = self.transfers.lock().unwrap();
        transfers.push(request.clone());
        if transfers.len() <= self.fail_transfers {
            return Err(CallError::Transfer("486 Busy Here".to_string()));
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn directory(numbers: &[(&str, &str)]) -> Arc<DepartmentDirectory> {
    let numbers: HashMap<String, String> = numbers
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Arc::new(DepartmentDirectory::from_source(standard_entries(), &numbers).unwrap())
}

pub fn full_directory() -> Arc<DepartmentDirectory> {
    directory(&[
        ("BILLING_PHONE_NUMBER", "+15550000001"),
        ("TECH_SUPPORT_PHONE_NUMBER", "+15550000002"),
        ("CUSTOMER_SERVICE_PHONE_NUMBER", "+15550000003"),
    ])
}

pub fn settings() -> Arc<SessionSettings> {
    Arc::new(SessionSettings {
        join_timeout: Duration::from_millis(500),
        transfer_delay: Duration::ZERO,
        reprompt_unknown_digit: true,
        greeting: "Hi, thanks for calling Vandelay Industries!".to_string(),
        profile: AssistantProfile {
            instructions: "You are a friendly assistant providing support.".to_string(),
            voice: "sage".to_string(),
            modalities: vec![Modality::Audio, Modality::Text],
            api_key: "sk-test".to_string(),
        },
    })
}

pub fn caller() -> ParticipantIdentity {
    ParticipantIdentity::new("sip_caller")
}
