//! Call-session orchestration for the intercom doorbell bot.
//!
//! One process invocation is one session: resolve the recording, notify the
//! operator, wait (bounded) for a decision, drive the door-control side
//! effect, clean up, report an exit status. The channel and gateway are
//! capability traits so the orchestrator stays free of transport details.

pub mod channel;
pub mod error;
pub mod gateway;
pub mod orchestrator;

pub use {
    channel::{KeyboardAction, NotificationChannel, OperatorCommand, WaitOutcome},
    error::{Error, ExitStatus, Result},
    gateway::{DoorGateway, NoopDoorGateway},
    orchestrator::{Decision, Orchestrator, SessionReport, SessionState},
};
