//! Telegram notification channel for the doorbell bot.
//!
//! Implements `NotificationChannel` with the teloxide Bot API client:
//! voice upload, a one-time decision keyboard, and a manual `getUpdates`
//! long-poll loop with an explicit offset so stale commands are never
//! redelivered into a later session.

pub mod channel;
pub mod command;
pub mod error;

pub use {
    channel::TelegramChannel,
    error::{Error, Result},
};
