//! Asterisk Gateway Interface (AGI) bindings for the door-control side
//! channel.
//!
//! The dial-plan invokes the bot as an AGI script: Asterisk writes an
//! `agi_*` environment block to stdin, then answers one command per line on
//! the same pipe. Only two verbs matter here — `EXEC SendDTMF` to open the
//! door and `EXEC Hangup` to drop the call.

pub mod connection;
pub mod error;
pub mod gateway;

pub use {
    connection::{AgiConnection, StdioConnection, accept_stdio, call_context_present},
    error::{Error, Result},
    gateway::AgiGateway,
};
