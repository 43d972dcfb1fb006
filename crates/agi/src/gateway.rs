//! `DoorGateway` implementation over a live AGI connection.

use std::{
    io::{BufRead, Write},
    sync::Mutex,
};

use {
    anyhow::{Result, anyhow},
    async_trait::async_trait,
    tracing::info,
};

use bellbot_session::DoorGateway;

use crate::connection::AgiConnection;

/// DTMF sequence the intercom's door relay listens for.
const DOOR_OPEN_DTMF: &str = "55555";

/// Door-control gateway driving the live call via AGI.
///
/// The connection is guarded by a `std::sync::Mutex`: AGI commands are
/// short synchronous line exchanges and the lock is never held across an
/// `.await` point.
pub struct AgiGateway<R, W> {
    conn: Mutex<AgiConnection<R, W>>,
}

impl<R: BufRead, W: Write> AgiGateway<R, W> {
    #[must_use]
    pub fn new(conn: AgiConnection<R, W>) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl<R, W> DoorGateway for AgiGateway<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    async fn signal_open(&self) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("agi connection poisoned"))?;
        conn.exec("SendDTMF", DOOR_OPEN_DTMF)?;
        info!(dtmf = DOOR_OPEN_DTMF, "door-open tone sequence sent");
        Ok(())
    }

    async fn signal_hangup(&self) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("agi connection poisoned"))?;
        conn.exec("Hangup", "")?;
        info!("call hangup requested");
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn gateway_with_replies(replies: &str) -> AgiGateway<Cursor<Vec<u8>>, Vec<u8>> {
        let input = format!("agi_request: bellbot\n\n{replies}");
        let conn =
            AgiConnection::accept(Cursor::new(input.into_bytes()), Vec::new()).unwrap();
        AgiGateway::new(conn)
    }

    fn written(gateway: &AgiGateway<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        let conn = gateway.conn.lock().unwrap();
        String::from_utf8(conn.writer.clone()).unwrap()
    }

    #[tokio::test]
    async fn open_sends_dtmf_sequence() {
        let gateway = gateway_with_replies("200 result=0\n");
        gateway.signal_open().await.unwrap();
        assert_eq!(written(&gateway), "EXEC SendDTMF \"55555\"\n");
    }

    #[tokio::test]
    async fn hangup_sends_hangup() {
        let gateway = gateway_with_replies("200 result=-1\n");
        gateway.signal_hangup().await.unwrap();
        assert_eq!(written(&gateway), "EXEC Hangup\n");
    }

    #[tokio::test]
    async fn rejected_command_surfaces_as_error() {
        let gateway = gateway_with_replies("510 Invalid or unknown command\n");
        let err = gateway.signal_open().await.unwrap_err();
        assert!(err.to_string().contains("510"));
    }
}
