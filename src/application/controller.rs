//! Call session controller
//!
//! Drives one call from join to cleanup: greets the caller, turns key
//! presses into at most one transfer, and releases platform resources
//! exactly once however the call ends.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn, Span};

use super::prompts;
use super::settings::SessionSettings;
use crate::domain::directory::{DepartmentDirectory, Resolution};
use crate::domain::dtmf::{DtmfDigit, DtmfEvent};
use crate::domain::platform::{PlatformEvent, PlatformEvents, SessionPlatform, TransferRequest};
use crate::domain::session::{CallSession, EndReason, ReleaseGuard, SessionState};
use crate::domain::shared::error::CallError;
use crate::domain::shared::events::DomainEvent;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::ParticipantIdentity;
use crate::domain::speech::Utterance;

/// Why a digit did not start a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    SessionEnded,
    TransferPending,
    UnknownDigit,
}

/// What `on_digit` did with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitOutcome {
    Ignored(IgnoreReason),
    /// Mapped department without a usable number
    Unavailable,
    TransferStarted,
}

type TransferTask = JoinHandle<Result<()>>;

pub struct CallSessionController<P: SessionPlatform + ?Sized + 'static> {
    platform: Arc<P>,
    directory: Arc<DepartmentDirectory>,
    settings: Arc<SessionSettings>,
    session: CallSession,
    events: PlatformEvents,
    /// Speech and transfer tasks to cancel on cleanup
    background: Mutex<Vec<AbortHandle>>,
    pending_transfer: Option<TransferTask>,
    release: ReleaseGuard,
}

impl<P: SessionPlatform + ?Sized + 'static> CallSessionController<P> {
    /// Attach to a new session and wait for the caller's participant.
    ///
    /// Fails with `CallError::Connection` if nobody connects within
    /// `settings.join_timeout`, or the session goes away first.
    pub async fn join(
        platform: Arc<P>,
        directory: Arc<DepartmentDirectory>,
        settings: Arc<SessionSettings>,
    ) -> Result<Self> {
        let room = platform.room_name();
        info!("Connecting to room: {}", room);

        let mut events = platform.connect().await.map_err(as_connection_error)?;
        let mut session = CallSession::new(room);
        Span::current().record("session_id", tracing::field::display(session.id()));

        let waited = tokio::time::timeout(settings.join_timeout, wait_for_participant(&mut events)).await;
        let participant = match waited {
            Ok(Ok(participant)) => participant,
            Ok(Err(e)) => {
                abandon(platform.as_ref()).await;
                return Err(e);
            }
            Err(_) => {
                abandon(platform.as_ref()).await;
                return Err(CallError::Connection(format!(
                    "no participant connected within {:?}",
                    settings.join_timeout
                )));
            }
        };

        info!("Participant {} connected", participant);
        session.bind_participant(participant)?;

        let mut controller = Self {
            platform,
            directory,
            settings,
            session,
            events,
            background: Mutex::new(Vec::new()),
            pending_transfer: None,
            release: ReleaseGuard::new(),
        };
        controller.log_session_events();
        Ok(controller)
    }

    /// Start the assistant and fire the greeting without waiting for it
    pub async fn greet(&mut self) -> Result<()> {
        let participant = self.participant()?;
        self.platform
            .start_assistant(&participant, &self.settings.profile)
            .await?;

        self.session.greeted()?;
        self.log_session_events();
        let greeting = Utterance::voice(self.settings.greeting.clone());
        self.speak_in_background(greeting).await;
        Ok(())
    }

    /// Handle one key press
    pub async fn on_digit(&mut self, event: DtmfEvent) -> DigitOutcome {
        counter!("switchboard_dtmf_digits_total").increment(1);
        info!("DTMF received - Code: {}, Digit: '{}'", event.code, event.digit);

        if !self.session.is_active() {
            return DigitOutcome::Ignored(IgnoreReason::SessionEnded);
        }
        if self.session.is_transfer_in_progress() {
            debug!("Transfer already in progress, ignoring digit {}", event.digit);
            return DigitOutcome::Ignored(IgnoreReason::TransferPending);
        }

        let directory = Arc::clone(&self.directory);
        match directory.resolve(event.digit) {
            Resolution::Unmapped => {
                debug!("Digit {} is not on the menu", event.digit);
                if self.settings.reprompt_unknown_digit {
                    self.speak_in_background(Utterance::voice(prompts::REPROMPT)).await;
                }
                DigitOutcome::Ignored(IgnoreReason::UnknownDigit)
            }
            Resolution::Misconfigured(department) => {
                warn!(
                    "No phone number configured for {} ({}); not transferring",
                    department.display_name, department.config_key
                );
                let apology = prompts::option_unavailable(&department.display_name);
                self.speak_in_background(Utterance::voice(apology)).await;
                DigitOutcome::Unavailable
            }
            Resolution::Destination(department, number) => {
                self.start_transfer(event.digit, &department.display_name, number.transfer_uri(), &event.participant)
                    .await
            }
        }
    }

    async fn start_transfer(
        &mut self,
        digit: DtmfDigit,
        department: &str,
        destination: String,
        pressed_by: &ParticipantIdentity,
    ) -> DigitOutcome {
        let participant = match self.session.participant() {
            Some(bound) => bound.clone(),
            None => pressed_by.clone(),
        };
        if &participant != pressed_by {
            debug!("Digit pressed by {}, transferring bound caller {}", pressed_by, participant);
        }

        if let Err(e) = self.session.begin_transfer(digit, department, &destination) {
            warn!("Cannot start transfer: {}", e);
            return DigitOutcome::Ignored(IgnoreReason::TransferPending);
        }

        let request = TransferRequest {
            participant_identity: participant,
            room_name: self.session.room().clone(),
            transfer_to: destination,
            play_dialtone: true,
        };

        let task = tokio::spawn(Self::transfer(
            Arc::clone(&self.platform),
            request,
            department.to_string(),
            self.settings.transfer_delay,
        ));
        self.background.lock().await.push(task.abort_handle());
        self.pending_transfer = Some(task);
        self.log_session_events();

        DigitOutcome::TransferStarted
    }

    /// Confirm to the caller, let the confirmation play, then redirect the call
    pub async fn transfer(
        platform: Arc<P>,
        request: TransferRequest,
        department: String,
        delay: Duration,
    ) -> Result<()> {
        let confirmation = Utterance::voice(prompts::transfer_confirmation(&department));
        if let Err(e) = platform.speak(&confirmation).await {
            warn!("Failed to speak transfer confirmation: {}", e);
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        info!(
            "Transferring call for participant {} to {}",
            request.participant_identity, request.transfer_to
        );
        platform
            .transfer_participant(&request)
            .await
            .map_err(|e| match e {
                CallError::Transfer(_) => e,
                other => CallError::Transfer(other.to_string()),
            })
    }

    /// Apply the result of the pending transfer
    pub async fn on_transfer_result(&mut self, result: Result<()>) {
        self.pending_transfer = None;

        match result {
            Ok(()) => {
                counter!("switchboard_transfers_total", "outcome" => "success").increment(1);
                if let Some(participant) = self.session.participant() {
                    info!("Successfully transferred participant {}", participant);
                }
                self.end(EndReason::Transferred).await;
            }
            Err(e) => {
                counter!("switchboard_transfers_total", "outcome" => "failure").increment(1);
                error!("Failed to transfer call: {}", e);
                if !self.session.is_active() {
                    return;
                }
                if let Err(state_err) = self.session.transfer_failed(&e.to_string()) {
                    debug!("Transfer failure not applied: {}", state_err);
                }
                self.log_session_events();
                self.speak_in_background(Utterance::voice(prompts::TRANSFER_FAILED)).await;
            }
        }
    }

    /// Wait for the pending transfer, if any, and apply its result
    pub async fn await_transfer(&mut self) -> bool {
        if self.pending_transfer.is_none() {
            return false;
        }
        let result = transfer_finished(&mut self.pending_transfer).await;
        self.on_transfer_result(result).await;
        true
    }

    /// Dispatch one platform event
    pub async fn handle_event(&mut self, event: Option<PlatformEvent>) {
        match event {
            Some(PlatformEvent::Dtmf(dtmf)) => {
                self.on_digit(dtmf).await;
            }
            Some(PlatformEvent::ParticipantConnected(identity)) => {
                debug!("Ignoring additional participant {}", identity);
            }
            Some(PlatformEvent::Disconnected(reason)) => {
                info!(
                    "Session disconnected: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
                self.end(EndReason::CallerDisconnected).await;
            }
            None => {
                info!("Session event stream closed");
                self.end(EndReason::CallerDisconnected).await;
            }
        }
    }

    /// Event loop until the session ends, then cleanup
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> EndReason {
        if *shutdown.borrow() {
            self.end(EndReason::Shutdown).await;
        }

        while self.session.is_active() {
            tokio::select! {
                event = self.events.recv() => {
                    self.handle_event(event).await;
                }
                result = transfer_finished(&mut self.pending_transfer) => {
                    self.on_transfer_result(result).await;
                }
                _ = shutdown.changed() => {
                    info!("Shutdown requested, ending session");
                    self.end(EndReason::Shutdown).await;
                }
            }
        }

        self.cleanup().await;
        match self.session.state() {
            SessionState::Ended(reason) => reason.clone(),
            other => EndReason::Failed(format!("loop exited in state {}", other)),
        }
    }

    /// Move to `Ended` (if not already) and release resources
    pub async fn end(&mut self, reason: EndReason) {
        if self.session.is_active() {
            info!("Ending session {}: {}", self.session.id(), reason);
            if let Err(e) = self.session.end(reason) {
                debug!("Session end not applied: {}", e);
            }
            self.log_session_events();
        }
        self.cleanup().await;
    }

    /// Release platform resources. Only the first call does anything.
    pub async fn cleanup(&self) -> bool {
        if !self.release.try_acquire() {
            debug!("Session {} already cleaned up", self.session.id());
            return false;
        }

        let handles = std::mem::take(&mut *self.background.lock().await);
        for handle in handles {
            handle.abort();
        }

        if let Err(e) = self.platform.disconnect().await {
            warn!("Error while disconnecting session {}: {}", self.session.id(), e);
        }
        info!("Session {} resources released", self.session.id());
        true
    }

    async fn speak_in_background(&self, utterance: Utterance) {
        if self.release.is_released() {
            return;
        }
        let platform = Arc::clone(&self.platform);
        let task = tokio::spawn(async move {
            debug!("Asked assistant to say: {}", utterance.text());
            if let Err(e) = platform.speak(&utterance).await {
                warn!("Failed to speak: {}", e);
            }
        });

        let mut background = self.background.lock().await;
        background.retain(|handle| !handle.is_finished());
        background.push(task.abort_handle());
    }

    fn log_session_events(&mut self) {
        for event in self.session.take_events() {
            info!(event = event.event_type(), "{}", event.describe());
        }
    }

    fn participant(&self) -> Result<ParticipantIdentity> {
        self.session
            .participant()
            .cloned()
            .ok_or_else(|| CallError::InvalidStateTransition("no participant bound".to_string()))
    }

    // Getters
    pub fn session(&self) -> &CallSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CallSession {
        &mut self.session
    }

    pub fn is_released(&self) -> bool {
        self.release.is_released()
    }

    pub fn has_pending_transfer(&self) -> bool {
        self.pending_transfer.is_some()
    }
}

async fn wait_for_participant(events: &mut PlatformEvents) -> Result<ParticipantIdentity> {
    loop {
        match events.recv().await {
            Some(PlatformEvent::ParticipantConnected(identity)) => return Ok(identity),
            Some(PlatformEvent::Dtmf(dtmf)) => {
                debug!("Dropping digit {} received before the caller connected", dtmf.digit);
            }
            Some(PlatformEvent::Disconnected(_)) => {
                return Err(CallError::Connection(
                    "session disconnected before a participant connected".to_string(),
                ));
            }
            None => {
                return Err(CallError::Connection(
                    "session event stream closed before a participant connected".to_string(),
                ));
            }
        }
    }
}

async fn transfer_finished(pending: &mut Option<TransferTask>) -> Result<()> {
    match pending.as_mut() {
        Some(task) => match task.await {
            Ok(result) => result,
            Err(e) => Err(CallError::Transfer(format!("transfer task stopped: {}", e))),
        },
        None => std::future::pending().await,
    }
}

async fn abandon<P: SessionPlatform + ?Sized>(platform: &P) {
    if let Err(e) = platform.disconnect().await {
        warn!("Error while abandoning session: {}", e);
    }
}

fn as_connection_error(err: CallError) -> CallError {
    match err {
        CallError::Connection(_) => err,
        other => CallError::Connection(other.to_string()),
    }
}
