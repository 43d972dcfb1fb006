//! Configuration loading for the doorbell bot.
//!
//! Config files: `bellbot.toml` or `bellbot.json`, searched in `./` then
//! `~/.config/bellbot/`. Supports `${ENV_VAR}` substitution in the raw
//! file, so the bot token can stay out of the config on disk.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{find_config_file, load},
    schema::{AgiConfig, BellbotConfig, SessionConfig, TelegramConfig},
};
