//! Inbound command recognition.

use bellbot_session::OperatorCommand;

/// Recognize a door command in raw message text.
///
/// Telegram clients append `@botname` when a command is picked from a
/// keyboard in some contexts; the suffix is stripped before matching.
/// Anything that is not exactly `/open` or `/reject` is not a command.
#[must_use]
pub fn recognize(text: &str) -> Option<OperatorCommand> {
    let token = text.trim().split_whitespace().next()?;
    let bare = token.split('@').next()?;
    OperatorCommand::parse(bare)
}
