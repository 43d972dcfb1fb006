//! The call-session state machine.
//!
//! `Start → Resolving → Notifying → AwaitingDecision → Acting → Cleanup →
//! Done`, with `Error` absorbing resolver failures. Resolver failures abort
//! before anything is sent (cheap failure, no operator-visible noise); every
//! branch after notification reaches cleanup exactly once, even when the
//! decision or acting step failed.

use std::{path::Path, sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::{
    channel::{KeyboardAction, NotificationChannel, OperatorCommand, WaitOutcome},
    error::{Error, ExitStatus, Result},
    gateway::DoorGateway,
};

const OPEN_CONFIRMATION: &str = "Door open signal sent.";
const REJECT_CONFIRMATION: &str = "Rejected.";
const SESSION_CLOSED: &str = "Session is over.";

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Start,
    Resolving,
    Notifying,
    AwaitingDecision,
    Acting,
    Cleanup,
    Done,
    Error,
}

/// Terminal decision of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Open,
    Reject,
    /// The response window elapsed. Not an error; the call has likely
    /// already ended naturally, so no gateway action is taken.
    Timeout,
    /// The host call was torn down mid-wait. Same cleanup path as timeout,
    /// distinguished only in the exit status.
    Interrupted,
}

/// What a completed session reports back to the process boundary.
#[derive(Debug, Clone, Copy)]
pub struct SessionReport {
    pub decision: Decision,
}

impl SessionReport {
    #[must_use]
    pub const fn exit_status(&self) -> ExitStatus {
        match self.decision {
            Decision::Open | Decision::Reject | Decision::Timeout => ExitStatus::Success,
            Decision::Interrupted => ExitStatus::Interrupted,
        }
    }
}

/// Drives one call session from recording path to terminal decision.
///
/// All collaborators are explicit constructor arguments; the orchestrator
/// holds the only handles to the channel and gateway for the session's
/// lifetime.
pub struct Orchestrator {
    channel: Arc<dyn NotificationChannel>,
    gateway: Arc<dyn DoorGateway>,
    window: Duration,
    state: SessionState,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        channel: Arc<dyn NotificationChannel>,
        gateway: Arc<dyn DoorGateway>,
        window: Duration,
    ) -> Self {
        Self {
            channel,
            gateway,
            window,
            state: SessionState::Start,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion.
    ///
    /// Errors carry the terminal exit status via [`ExitStatus::from`];
    /// post-notification errors have already had best-effort cleanup
    /// applied by the time they surface here.
    pub async fn run(&mut self, recording_path: &Path) -> Result<SessionReport> {
        self.state = SessionState::Resolving;
        let recording = match bellbot_media::resolve(recording_path).await {
            Ok(recording) => recording,
            Err(e) => {
                self.state = SessionState::Error;
                return Err(e.into());
            },
        };
        info!(
            path = %recording.path.display(),
            transcoded = recording.transcoded,
            "recording resolved"
        );

        // From here on the operator may have been notified, so cleanup must
        // run no matter how the decision path ends.
        let driven = self.drive(&recording).await;
        self.cleanup().await;
        self.state = SessionState::Done;

        let decision = driven?;
        info!(?decision, "session decided");
        Ok(SessionReport { decision })
    }

    /// Notify, await the decision, act on it.
    async fn drive(&mut self, recording: &bellbot_media::NormalizedRecording) -> Result<Decision> {
        self.state = SessionState::Notifying;
        self.channel
            .send_recording(recording)
            .await
            .map_err(Error::transport)?;
        self.channel
            .send_message(&decision_prompt(self.window), KeyboardAction::Offer)
            .await
            .map_err(Error::transport)?;

        self.state = SessionState::AwaitingDecision;
        let outcome = self
            .channel
            .await_command(self.window)
            .await
            .map_err(Error::transport)?;

        self.state = SessionState::Acting;
        match outcome {
            WaitOutcome::Command(OperatorCommand::Open) => {
                self.gateway.signal_open().await.map_err(Error::transport)?;
                self.channel
                    .send_message(OPEN_CONFIRMATION, KeyboardAction::Keep)
                    .await
                    .map_err(Error::transport)?;
                Ok(Decision::Open)
            },
            WaitOutcome::Command(OperatorCommand::Reject) => {
                self.gateway
                    .signal_hangup()
                    .await
                    .map_err(Error::transport)?;
                self.channel
                    .send_message(REJECT_CONFIRMATION, KeyboardAction::Keep)
                    .await
                    .map_err(Error::transport)?;
                Ok(Decision::Reject)
            },
            WaitOutcome::TimedOut => Ok(Decision::Timeout),
            WaitOutcome::Interrupted => Ok(Decision::Interrupted),
        }
    }

    /// Closing message (removing the keyboard) first, then drain — this
    /// ordering is the contract. Failures here are logged and swallowed;
    /// the session is ending regardless.
    async fn cleanup(&mut self) {
        self.state = SessionState::Cleanup;
        if let Err(e) = self
            .channel
            .send_message(SESSION_CLOSED, KeyboardAction::Remove)
            .await
        {
            warn!(error = %e, "failed to send session-closed message");
        }
        if let Err(e) = self.channel.drain_pending().await {
            warn!(error = %e, "failed to drain pending updates");
        }
    }
}

fn decision_prompt(window: Duration) -> String {
    format!(
        "Visitor at the door. Reply /open or /reject ({}s to answer).",
        window.as_secs()
    )
}
