use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

/// Top-level configuration, loaded once at startup and immutable for the
/// process lifetime.
#[derive(Debug, Deserialize)]
pub struct BellbotConfig {
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub agi: AgiConfig,
}

/// Telegram transport credential and the operator identity.
#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: Secret<String>,

    /// Chat id of the single operator allowed to issue door commands.
    /// Commands from any other chat are silently ignored.
    pub chat_id: i64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramConfig {
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Session-level tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long the operator has to answer before the session times out.
    pub response_window_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            response_window_secs: 20,
        }
    }
}

/// Door-gateway availability.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgiConfig {
    /// Force the gateway on or off. Unset means auto-detect from the
    /// Asterisk AGI environment.
    pub enabled: Option<bool>,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_toml() {
        let cfg: BellbotConfig = toml::from_str(
            r#"
            [telegram]
            token = "123:ABC"
            chat_id = 99999
            "#,
        )
        .unwrap();

        assert_eq!(cfg.telegram.token(), "123:ABC");
        assert_eq!(cfg.telegram.chat_id, 99999);
        // defaults
        assert_eq!(cfg.session.response_window_secs, 20);
        assert_eq!(cfg.agi.enabled, None);
    }

    #[test]
    fn deserializes_overrides() {
        let cfg: BellbotConfig = toml::from_str(
            r#"
            [telegram]
            token = "tok"
            chat_id = 1

            [session]
            response_window_secs = 45

            [agi]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.session.response_window_secs, 45);
        assert_eq!(cfg.agi.enabled, Some(false));
    }

    #[test]
    fn debug_redacts_token() {
        let cfg: TelegramConfig = toml::from_str(
            r#"
            token = "super-secret"
            chat_id = 7
            "#,
        )
        .unwrap();
        let debug = format!("{cfg:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }
}
