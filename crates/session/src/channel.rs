//! Notification channel capability consumed by the orchestrator.

use std::time::Duration;

use {anyhow::Result, async_trait::async_trait};

use bellbot_media::NormalizedRecording;

/// The two door-control intents an operator can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Open,
    Reject,
}

impl OperatorCommand {
    /// Parse a bare command token. Anything else is not a recognized
    /// command and must be consumed without ending the decision wait.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "/open" => Some(Self::Open),
            "/reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// What a bounded decision wait produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A recognized command arrived from the operator.
    Command(OperatorCommand),
    /// The response window elapsed with no matching command.
    TimedOut,
    /// `stop_listening` fired mid-wait (host call torn down).
    Interrupted,
}

/// Keyboard handling attached to an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAction {
    /// Attach the one-time decision keyboard (`/open` / `/reject`).
    Offer,
    /// Remove any keyboard previously offered.
    Remove,
    /// Leave the keyboard state alone.
    Keep,
}

/// Chat transport capability required by the orchestrator.
///
/// A session owns exactly one channel for its lifetime. Implementations
/// must only surface commands from the configured operator identity;
/// everything else is consumed silently.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Fire-and-forget text delivery to the operator.
    async fn send_message(&self, text: &str, keyboard: KeyboardAction) -> Result<()>;

    /// Upload the normalized recording as a voice attachment.
    async fn send_recording(&self, recording: &NormalizedRecording) -> Result<()>;

    /// Block until the first recognized operator command, the end of the
    /// response window, or an interrupt — whichever comes first. Returning
    /// on the first match is what guarantees a second command can never be
    /// acted on within the same session.
    async fn await_command(&self, window: Duration) -> Result<WaitOutcome>;

    /// Idempotent. Makes an in-flight `await_command` return
    /// [`WaitOutcome::Interrupted`] promptly.
    fn stop_listening(&self);

    /// Acknowledge every inbound update seen so far, so a future session
    /// never reacts to stale commands. Called once, at cleanup.
    async fn drain_pending(&self) -> Result<()>;
}
