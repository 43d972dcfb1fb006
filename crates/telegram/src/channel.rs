//! `NotificationChannel` backed by the Telegram Bot API.

use std::{
    sync::atomic::{AtomicI32, Ordering},
    time::Duration,
};

use {
    async_trait::async_trait,
    teloxide::{
        prelude::*,
        types::{
            AllowedUpdate, ChatId, InputFile, KeyboardButton, KeyboardMarkup, KeyboardRemove,
            ReplyMarkup, Update, UpdateKind,
        },
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info},
};

use {
    bellbot_config::TelegramConfig,
    bellbot_media::NormalizedRecording,
    bellbot_session::{KeyboardAction, NotificationChannel, OperatorCommand, WaitOutcome},
};

use crate::{command, error::Result};

/// Upper bound for a single getUpdates long poll, in seconds.
const LONG_POLL_SECS: u64 = 25;

/// One session's handle on the Telegram transport.
///
/// Holds the bot client, the operator chat id, the getUpdates offset, and
/// the cancellation token observed by the decision wait.
pub struct TelegramChannel {
    bot: Bot,
    operator: ChatId,
    offset: AtomicI32,
    cancel: CancellationToken,
}

impl TelegramChannel {
    /// Build the client and verify the credential with `getMe`.
    pub async fn connect(config: &TelegramConfig) -> anyhow::Result<Self> {
        // Client timeout above the long-poll timeout so the HTTP layer
        // doesn't abort a poll before Telegram responds.
        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(LONG_POLL_SECS + 20))
            .build()?;
        let bot = Bot::with_client(config.token(), client);

        let me = bot.get_me().await?;
        info!(username = ?me.username, operator = config.chat_id, "telegram bot connected");

        Ok(Self {
            bot,
            operator: ChatId(config.chat_id),
            offset: AtomicI32::new(0),
            cancel: CancellationToken::new(),
        })
    }

    fn note_seen(&self, update: &Update) {
        self.offset.store(update.id.as_offset(), Ordering::SeqCst);
    }

    /// Fast-forward past updates that piled up before this session, so a
    /// command sent for an earlier call can never open the door now.
    async fn skip_backlog(&self) -> Result<()> {
        let stale = self.bot.get_updates().offset(-1).await?;
        for update in &stale {
            self.note_seen(update);
        }
        if !stale.is_empty() {
            debug!("skipped stale update backlog");
        }
        Ok(())
    }

    async fn fetch_updates(&self, poll_secs: u32) -> Result<Vec<Update>> {
        let updates = self
            .bot
            .get_updates()
            .offset(self.offset.load(Ordering::SeqCst))
            .timeout(poll_secs)
            .allowed_updates(vec![AllowedUpdate::Message])
            .await?;
        Ok(updates)
    }

    /// Poll until the first recognized operator command. No deadline here;
    /// `await_command` bounds this with the response window.
    async fn poll_for_command(&self) -> Result<WaitOutcome> {
        loop {
            let updates = self.fetch_updates(LONG_POLL_SECS as u32).await?;
            for update in updates {
                self.note_seen(&update);
                let UpdateKind::Message(msg) = update.kind else {
                    continue;
                };
                match classify(self.operator, msg.chat.id, msg.text()) {
                    Inbound::Command(cmd) => {
                        info!(?cmd, "operator command received");
                        return Ok(WaitOutcome::Command(cmd));
                    },
                    Inbound::ForeignSender => {
                        debug!(chat_id = msg.chat.id.0, "ignoring message from non-operator chat");
                    },
                    Inbound::Unrecognized => {
                        debug!("ignoring unrecognized text from operator");
                    },
                }
            }
        }
    }

    fn decision_keyboard() -> KeyboardMarkup {
        KeyboardMarkup::new(vec![vec![
            KeyboardButton::new("/open"),
            KeyboardButton::new("/reject"),
        ]])
        .one_time_keyboard()
    }
}

/// How one inbound message relates to the decision wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inbound {
    /// A recognized command from the operator; ends the wait.
    Command(OperatorCommand),
    /// Message from a chat other than the operator's. Consumed, ignored.
    ForeignSender,
    /// Operator text that is not a door command. Consumed, ignored.
    Unrecognized,
}

/// Classify one inbound message against the operator identity. Only a
/// recognized command from the operator chat may end the wait; everything
/// else is consumed without acting.
fn classify(operator: ChatId, sender: ChatId, text: Option<&str>) -> Inbound {
    if sender != operator {
        return Inbound::ForeignSender;
    }
    match text.and_then(command::recognize) {
        Some(cmd) => Inbound::Command(cmd),
        None => Inbound::Unrecognized,
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    async fn send_message(&self, text: &str, keyboard: KeyboardAction) -> anyhow::Result<()> {
        let mut request = self.bot.send_message(self.operator, text);
        match keyboard {
            KeyboardAction::Offer => {
                request = request.reply_markup(ReplyMarkup::Keyboard(Self::decision_keyboard()));
            },
            KeyboardAction::Remove => {
                request =
                    request.reply_markup(ReplyMarkup::KeyboardRemove(KeyboardRemove::new()));
            },
            KeyboardAction::Keep => {},
        }
        request.await?;
        debug!(len = text.len(), ?keyboard, "message sent to operator");
        Ok(())
    }

    async fn send_recording(&self, recording: &NormalizedRecording) -> anyhow::Result<()> {
        self.bot
            .send_voice(self.operator, InputFile::file(recording.path.clone()))
            .await?;
        info!(
            path = %recording.path.display(),
            kind = recording.kind.extension(),
            "recording sent to operator"
        );
        Ok(())
    }

    async fn await_command(&self, window: Duration) -> anyhow::Result<WaitOutcome> {
        self.skip_backlog().await?;

        let polling = async {
            tokio::select! {
                () = self.cancel.cancelled() => Ok(WaitOutcome::Interrupted),
                result = self.poll_for_command() => result,
            }
        };
        match tokio::time::timeout(window, polling).await {
            Ok(outcome) => Ok(outcome?),
            Err(_) => {
                debug!(window_secs = window.as_secs(), "decision window elapsed");
                Ok(WaitOutcome::TimedOut)
            },
        }
    }

    fn stop_listening(&self) {
        // Idempotent; a second call is a no-op.
        self.cancel.cancel();
    }

    async fn drain_pending(&self) -> anyhow::Result<()> {
        // Confirm everything up to the last update seen, as the final act
        // of the session. Short poll so shutdown stays fast.
        self.bot
            .get_updates()
            .offset(self.offset.load(Ordering::SeqCst))
            .timeout(1)
            .await?;
        debug!("pending updates drained");
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const OPERATOR: ChatId = ChatId(99999);
    const STRANGER: ChatId = ChatId(11111);

    #[rstest]
    #[case(OPERATOR, Some("/open"), Inbound::Command(OperatorCommand::Open))]
    #[case(OPERATOR, Some("/reject"), Inbound::Command(OperatorCommand::Reject))]
    #[case(OPERATOR, Some("hello?"), Inbound::Unrecognized)]
    #[case(OPERATOR, Some("/close"), Inbound::Unrecognized)]
    #[case(OPERATOR, None, Inbound::Unrecognized)]
    #[case(STRANGER, Some("/open"), Inbound::ForeignSender)]
    #[case(STRANGER, Some("/reject"), Inbound::ForeignSender)]
    #[case(STRANGER, Some("hello?"), Inbound::ForeignSender)]
    fn classifies_inbound_messages(
        #[case] sender: ChatId,
        #[case] text: Option<&str>,
        #[case] expected: Inbound,
    ) {
        assert_eq!(classify(OPERATOR, sender, text), expected);
    }

    /// A batch is scanned in order and only the first recognized operator
    /// command counts; a stranger's command can never be the one acted on.
    #[test]
    fn first_operator_command_wins() {
        let batch = [
            (STRANGER, Some("/open")),
            (OPERATOR, Some("let me check")),
            (OPERATOR, Some("/open")),
            (OPERATOR, Some("/reject")),
        ];
        let first = batch.iter().find_map(|(sender, text)| {
            match classify(OPERATOR, *sender, *text) {
                Inbound::Command(cmd) => Some(cmd),
                Inbound::ForeignSender | Inbound::Unrecognized => None,
            }
        });
        assert_eq!(first, Some(OperatorCommand::Open));
    }

    #[test]
    fn foreign_commands_alone_never_decide() {
        let batch = [(STRANGER, Some("/open")), (STRANGER, Some("/reject"))];
        let first = batch.iter().find_map(|(sender, text)| {
            match classify(OPERATOR, *sender, *text) {
                Inbound::Command(cmd) => Some(cmd),
                Inbound::ForeignSender | Inbound::Unrecognized => None,
            }
        });
        assert_eq!(first, None);
    }

    #[test]
    fn decision_keyboard_offers_both_commands() {
        let markup = TelegramChannel::decision_keyboard();
        let rows: Vec<Vec<String>> = markup
            .keyboard
            .iter()
            .map(|row| row.iter().map(|b| b.text.clone()).collect())
            .collect();
        assert_eq!(rows, vec![vec!["/open".to_string(), "/reject".to_string()]]);
        assert!(markup.one_time_keyboard);
    }
}
