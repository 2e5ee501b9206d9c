//! Call listener - accepts new call sessions and runs each one in isolation

use metrics::{counter, gauge};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};

use super::controller::CallSessionController;
use super::settings::SessionSettings;
use crate::domain::directory::DepartmentDirectory;
use crate::domain::platform::SessionPlatform;
use crate::domain::session::EndReason;
use crate::domain::shared::result::Result;

/// A call session detected by the platform, ready to be joined
pub struct IncomingCall {
    pub platform: Arc<dyn SessionPlatform>,
}

impl IncomingCall {
    pub fn new(platform: Arc<dyn SessionPlatform>) -> Self {
        Self { platform }
    }
}

/// Totals reported when the listener stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub accepted: usize,
    pub completed: usize,
    pub failed: usize,
}

pub struct CallListener {
    directory: Arc<DepartmentDirectory>,
    settings: Arc<SessionSettings>,
    shutdown: watch::Receiver<bool>,
}

impl CallListener {
    pub fn new(
        directory: Arc<DepartmentDirectory>,
        settings: Arc<SessionSettings>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            directory,
            settings,
            shutdown,
        }
    }

    /// Serve calls until `incoming` closes or shutdown is signalled, then
    /// wait for every live session to finish.
    pub async fn run(mut self, mut incoming: mpsc::Receiver<IncomingCall>) -> ListenerStats {
        let mut sessions: JoinSet<Result<EndReason>> = JoinSet::new();
        let mut stats = ListenerStats::default();

        info!("Call listener started");

        loop {
            tokio::select! {
                call = incoming.recv() => {
                    let Some(call) = call else {
                        info!("Incoming call channel closed");
                        break;
                    };
                    stats.accepted += 1;
                    let room = call.platform.room_name();
                    let span = info_span!(
                        "call_session",
                        room = %room,
                        session_id = tracing::field::Empty
                    );
                    sessions.spawn(
                        serve_call(
                            call.platform,
                            Arc::clone(&self.directory),
                            Arc::clone(&self.settings),
                            self.shutdown.clone(),
                        )
                        .instrument(span),
                    );
                }
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    record_outcome(&mut stats, joined);
                }
                _ = self.shutdown.changed() => {
                    info!("Call listener shutting down with {} live sessions", sessions.len());
                    break;
                }
            }
        }

        while let Some(joined) = sessions.join_next().await {
            record_outcome(&mut stats, joined);
        }

        info!(
            "Call listener stopped: {} accepted, {} completed, {} failed",
            stats.accepted, stats.completed, stats.failed
        );
        stats
    }
}

/// Run one call from join to cleanup
async fn serve_call(
    platform: Arc<dyn SessionPlatform>,
    directory: Arc<DepartmentDirectory>,
    settings: Arc<SessionSettings>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<EndReason> {
    counter!("switchboard_sessions_total").increment(1);
    gauge!("switchboard_active_sessions").increment(1.0);

    let result = async {
        let joined = tokio::select! {
            joined = CallSessionController::join(Arc::clone(&platform), directory, settings) => joined,
            _ = shutdown.changed() => {
                if let Err(e) = platform.disconnect().await {
                    warn!("Error while abandoning session: {}", e);
                }
                return Ok(EndReason::Shutdown);
            }
        };

        let mut controller = match joined {
            Ok(controller) => controller,
            Err(e) => {
                error!("Failed to join session: {}", e);
                return Err(e);
            }
        };

        if let Err(e) = controller.greet().await {
            error!("Failed to start assistant: {}", e);
            controller.end(EndReason::Failed(e.to_string())).await;
            return Err(e);
        }

        Ok(controller.run(shutdown).await)
    }
    .await;

    gauge!("switchboard_active_sessions").decrement(1.0);
    result
}

fn record_outcome(
    stats: &mut ListenerStats,
    joined: std::result::Result<Result<EndReason>, tokio::task::JoinError>,
) {
    match joined {
        Ok(Ok(reason)) => {
            stats.completed += 1;
            info!("Call session finished: {}", reason);
        }
        Ok(Err(e)) => {
            stats.failed += 1;
            warn!("Call session failed: {}", e);
        }
        Err(e) => {
            stats.failed += 1;
            error!("Call session task panicked: {}", e);
        }
    }
}
