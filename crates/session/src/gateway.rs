//! Door-control gateway capability, plus the no-op used outside live calls.

use {anyhow::Result, async_trait::async_trait, tracing::debug};

/// Side channel into the live call. Both signals are best-effort and
/// fire-and-forget; neither is ever retried.
#[async_trait]
pub trait DoorGateway: Send + Sync {
    /// Emit the door-open tone sequence into the call.
    async fn signal_open(&self) -> Result<()>;

    /// Terminate the call.
    async fn signal_hangup(&self) -> Result<()>;
}

/// Gateway used when no live call context is present (dry runs, tests).
/// Absence of a gateway is a valid configuration, not an error.
pub struct NoopDoorGateway;

#[async_trait]
impl DoorGateway for NoopDoorGateway {
    async fn signal_open(&self) -> Result<()> {
        debug!("no live call context; door-open signal dropped");
        Ok(())
    }

    async fn signal_hangup(&self) -> Result<()> {
        debug!("no live call context; hangup signal dropped");
        Ok(())
    }
}
