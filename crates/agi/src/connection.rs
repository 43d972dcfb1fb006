//! Line-based AGI protocol over a reader/writer pair.
//!
//! Generic over `BufRead`/`Write` so the protocol is testable against
//! in-memory buffers; production uses stdio via [`accept_stdio`].

use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Stdin, Stdout, Write},
};

use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable Asterisk sets for AGI scripts. Its presence is how
/// we detect a live call context.
const AGI_DIR_ENV: &str = "AST_AGI_DIR";

/// True when the process was invoked from an Asterisk dial-plan.
#[must_use]
pub fn call_context_present() -> bool {
    std::env::var_os(AGI_DIR_ENV).is_some()
}

/// An accepted AGI session: parsed environment block plus the command pipe.
#[derive(Debug)]
pub struct AgiConnection<R, W> {
    reader: R,
    pub(crate) writer: W,
    env: HashMap<String, String>,
}

pub type StdioConnection = AgiConnection<BufReader<Stdin>, Stdout>;

/// Accept the AGI session on stdio. Blocks until Asterisk has written the
/// full environment block.
pub fn accept_stdio() -> Result<StdioConnection> {
    AgiConnection::accept(BufReader::new(std::io::stdin()), std::io::stdout())
}

impl<R: BufRead, W: Write> AgiConnection<R, W> {
    /// Read the `agi_*` environment block (terminated by a blank line) and
    /// take ownership of the command pipe.
    pub fn accept(mut reader: R, writer: W) -> Result<Self> {
        let mut env = HashMap::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                return Err(Error::ChannelClosed);
            }
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(Error::MalformedEnv { line: line.into() });
            };
            env.insert(key.trim().to_string(), value.trim().to_string());
        }
        debug!(vars = env.len(), "agi environment accepted");
        Ok(Self {
            reader,
            writer,
            env,
        })
    }

    /// Look up a variable from the environment block (e.g. `agi_request`).
    #[must_use]
    pub fn env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Log a message into the Asterisk console.
    pub fn verbose(&mut self, message: &str) -> Result<()> {
        self.command(&format!("VERBOSE \"{message}\" 1"))?;
        Ok(())
    }

    /// Execute a dial-plan application, returning its numeric result.
    pub fn exec(&mut self, app: &str, arg: &str) -> Result<i64> {
        if arg.is_empty() {
            self.command(&format!("EXEC {app}"))
        } else {
            self.command(&format!("EXEC {app} \"{arg}\""))
        }
    }

    /// Send one command line and parse the `200 result=<n>` reply. Any
    /// other status is a rejection.
    fn command(&mut self, line: &str) -> Result<i64> {
        debug!(command = line, "agi command");
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        let mut reply = String::new();
        if self.reader.read_line(&mut reply)? == 0 {
            return Err(Error::ChannelClosed);
        }
        let reply = reply.trim_end();
        if !reply.starts_with("200") {
            return Err(Error::CommandRejected {
                reply: reply.into(),
            });
        }
        let result = reply
            .split_once("result=")
            .and_then(|(_, rest)| {
                rest.split_whitespace()
                    .next()
                    .and_then(|v| v.parse::<i64>().ok())
            })
            .unwrap_or(0);
        Ok(result)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const ENV_BLOCK: &str = "agi_network: yes\n\
                             agi_request: bellbot\n\
                             agi_channel: SIP/intercom-00000001\n\
                             \n";

    fn accept_with(input: &str) -> AgiConnection<Cursor<Vec<u8>>, Vec<u8>> {
        let reader = Cursor::new(input.as_bytes().to_vec());
        AgiConnection::accept(reader, Vec::new()).unwrap()
    }

    #[test]
    fn parses_environment_block() {
        let conn = accept_with(ENV_BLOCK);
        assert_eq!(conn.env("agi_request"), Some("bellbot"));
        assert_eq!(conn.env("agi_channel"), Some("SIP/intercom-00000001"));
        assert_eq!(conn.env("agi_missing"), None);
    }

    #[test]
    fn malformed_env_line_is_an_error() {
        let reader = Cursor::new(b"not a key value pair\n\n".to_vec());
        let err = AgiConnection::accept(reader, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::MalformedEnv { .. }));
    }

    #[test]
    fn truncated_env_block_is_channel_closed() {
        let reader = Cursor::new(b"agi_network: yes\n".to_vec());
        let err = AgiConnection::accept(reader, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::ChannelClosed));
    }

    #[test]
    fn exec_encodes_command_and_parses_reply() {
        let input = format!("{ENV_BLOCK}200 result=0\n");
        let mut conn = accept_with(&input);

        let result = conn.exec("SendDTMF", "55555").unwrap();
        assert_eq!(result, 0);
        let written = String::from_utf8(conn.writer.clone()).unwrap();
        assert_eq!(written, "EXEC SendDTMF \"55555\"\n");
    }

    #[test]
    fn exec_without_arg_omits_quotes() {
        let input = format!("{ENV_BLOCK}200 result=-1\n");
        let mut conn = accept_with(&input);

        let result = conn.exec("Hangup", "").unwrap();
        assert_eq!(result, -1);
        let written = String::from_utf8(conn.writer.clone()).unwrap();
        assert_eq!(written, "EXEC Hangup\n");
    }

    #[test]
    fn non_200_reply_is_rejected() {
        let input = format!("{ENV_BLOCK}510 Invalid or unknown command\n");
        let mut conn = accept_with(&input);

        let err = conn.exec("SendDTMF", "55555").unwrap_err();
        match err {
            Error::CommandRejected { reply } => {
                assert!(reply.starts_with("510"));
            },
            other => panic!("expected CommandRejected, got {other:?}"),
        }
    }

    #[test]
    fn verbose_is_accepted() {
        let input = format!("{ENV_BLOCK}200 result=1\n");
        let mut conn = accept_with(&input);

        conn.verbose("agi session started").unwrap();
        let written = String::from_utf8(conn.writer.clone()).unwrap();
        assert_eq!(written, "VERBOSE \"agi session started\" 1\n");
    }
}
