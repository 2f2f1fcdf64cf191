//! The send/receive cycle with bounded fixed-delay retry.

use std::io;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::core::constants::CRLF;
use crate::core::error::SpamcError;
use crate::protocol::{Body, Command, RequestEncoder, SpamdResponse, decode};

use super::connection::Connection;
use super::pool::ConnectionPool;

/// Owns the request/response cycle, connection lifecycle, and fault
/// classification.
///
/// Transient socket faults are absorbed up to `max_tries` connection
/// attempts with a fixed delay in between; everything else surfaces
/// immediately. The attempt counter resets at the start of every
/// top-level [`send`](Transport::send), never across calls.
pub struct Transport<P: ConnectionPool> {
    pool: P,
    max_tries: u32,
    retry_delay: Duration,
}

impl<P: ConnectionPool> Transport<P> {
    /// Create a transport over `pool` with a bounded retry policy.
    pub fn new(pool: P, max_tries: u32, retry_delay: Duration) -> Self {
        Self {
            pool,
            max_tries: max_tries.max(1),
            retry_delay,
        }
    }

    /// Send `command` and decode its reply.
    pub async fn send(
        &self,
        encoder: &RequestEncoder,
        command: Command,
        body: &mut Body,
        extra_headers: &[(String, String)],
    ) -> Result<SpamdResponse, SpamcError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut conn = self.pool.acquire().await?;

            match exchange(&mut conn, encoder, command, body, extra_headers).await {
                Ok(raw) => match decode(command, &raw) {
                    Ok(response) => {
                        self.pool.release(conn, true).await;
                        return Ok(response);
                    }
                    Err(err) => {
                        self.pool.release(conn, false).await;
                        return Err(err.into());
                    }
                },
                Err(err) if is_transient(&err) => {
                    conn.close().await;
                    self.pool.release(conn, false).await;
                    if command.retry_safe() && attempt < self.max_tries {
                        warn!(
                            %command,
                            attempt,
                            max_tries = self.max_tries,
                            error = %err,
                            "transient fault, retrying"
                        );
                        sleep(self.retry_delay).await;
                        continue;
                    }
                    return Err(SpamcError::Transient {
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => {
                    conn.close().await;
                    self.pool.release(conn, false).await;
                    return Err(SpamcError::Io(err));
                }
            }
        }
    }
}

/// One full write/read cycle on an acquired connection.
///
/// Write order is fixed: header block, body, terminator, then the read.
async fn exchange<C: Connection>(
    conn: &mut C,
    encoder: &RequestEncoder,
    command: Command,
    body: &mut Body,
    extra_headers: &[(String, String)],
) -> io::Result<Vec<u8>> {
    body.rewind().await?;
    let content_length = RequestEncoder::content_length(body.byte_len().await?);
    let header_block = encoder.encode(command, content_length, extra_headers);

    conn.send(&header_block).await?;
    match body {
        Body::Empty => {}
        Body::Bytes(bytes) => conn.send(bytes).await?,
        Body::File(file) => {
            conn.send_stream(file).await?;
        }
    }
    conn.send(CRLF.as_bytes()).await?;

    conn.read().await
}

/// Socket conditions expected to clear on retry.
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ProtocolError;

    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::io::AsyncRead;
    use tokio::sync::Mutex;

    const OK_REPLY: &[u8] = b"SPAMD/1.5 0 EX_OK\r\nSpam: True ; 15 / 5\r\n\r\n\r\n";

    /// A connection that either fails its first write or replies verbatim.
    struct ScriptedConnection {
        fail_with: Option<io::ErrorKind>,
        reply: Vec<u8>,
    }

    impl ScriptedConnection {
        fn failing(kind: io::ErrorKind) -> Self {
            Self {
                fail_with: Some(kind),
                reply: Vec::new(),
            }
        }

        fn replying(reply: &[u8]) -> Self {
            Self {
                fail_with: None,
                reply: reply.to_vec(),
            }
        }
    }

    #[async_trait]
    impl Connection for ScriptedConnection {
        async fn send(&mut self, _data: &[u8]) -> io::Result<()> {
            match self.fail_with {
                Some(kind) => Err(kind.into()),
                None => Ok(()),
            }
        }

        async fn send_stream(
            &mut self,
            _src: &mut (dyn AsyncRead + Send + Unpin),
        ) -> io::Result<u64> {
            Ok(0)
        }

        async fn read(&mut self) -> io::Result<Vec<u8>> {
            Ok(self.reply.clone())
        }

        async fn close(&mut self) {}

        fn reusable(&self) -> bool {
            false
        }
    }

    /// Hands out pre-scripted connections and counts acquisitions.
    struct ScriptedPool {
        conns: Mutex<VecDeque<ScriptedConnection>>,
        acquired: Arc<AtomicU32>,
    }

    impl ScriptedPool {
        fn new(conns: Vec<ScriptedConnection>) -> (Self, Arc<AtomicU32>) {
            let acquired = Arc::new(AtomicU32::new(0));
            (
                Self {
                    conns: Mutex::new(conns.into()),
                    acquired: Arc::clone(&acquired),
                },
                acquired,
            )
        }
    }

    #[async_trait]
    impl ConnectionPool for ScriptedPool {
        type Conn = ScriptedConnection;

        async fn acquire(&self) -> Result<ScriptedConnection, SpamcError> {
            self.acquired.fetch_add(1, Ordering::SeqCst);
            self.conns
                .lock()
                .await
                .pop_front()
                .ok_or_else(|| SpamcError::Connect(io::Error::other("script exhausted")))
        }

        async fn release(&self, _conn: ScriptedConnection, _reusable: bool) {}
    }

    fn transport(conns: Vec<ScriptedConnection>, max_tries: u32) -> (Transport<ScriptedPool>, Arc<AtomicU32>) {
        let (pool, acquired) = ScriptedPool::new(conns);
        (
            Transport::new(pool, max_tries, Duration::from_millis(1)),
            acquired,
        )
    }

    async fn run(
        transport: &Transport<ScriptedPool>,
        command: Command,
    ) -> Result<SpamdResponse, SpamcError> {
        let encoder = RequestEncoder::new(None);
        let mut body = Body::from("test message");
        transport.send(&encoder, command, &mut body, &[]).await
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let (transport, acquired) = transport(vec![ScriptedConnection::replying(OK_REPLY)], 3);
        let response = run(&transport, Command::Check).await.unwrap();
        assert!(response.is_spam);
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_within_retry_budget() {
        // max_tries - 1 transient faults, then success: exactly max_tries
        // connection attempts.
        let (transport, acquired) = transport(
            vec![
                ScriptedConnection::failing(io::ErrorKind::ConnectionReset),
                ScriptedConnection::failing(io::ErrorKind::BrokenPipe),
                ScriptedConnection::replying(OK_REPLY),
            ],
            3,
        );
        let response = run(&transport, Command::Check).await.unwrap();
        assert_eq!(response.code, 0);
        assert_eq!(acquired.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retry_budget_escalates() {
        let (transport, acquired) = transport(
            vec![
                ScriptedConnection::failing(io::ErrorKind::ConnectionReset),
                ScriptedConnection::failing(io::ErrorKind::ConnectionReset),
                ScriptedConnection::failing(io::ErrorKind::ConnectionReset),
            ],
            3,
        );
        let err = run(&transport, Command::Check).await.unwrap_err();
        assert!(matches!(err, SpamcError::Transient { attempts: 3, .. }));
        assert_eq!(acquired.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_tell_is_never_retried() {
        let (transport, acquired) = transport(
            vec![
                ScriptedConnection::failing(io::ErrorKind::ConnectionReset),
                ScriptedConnection::replying(OK_REPLY),
            ],
            3,
        );
        let err = run(&transport, Command::Tell).await.unwrap_err();
        assert!(matches!(err, SpamcError::Transient { attempts: 1, .. }));
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_transient_fault_is_not_retried() {
        let (transport, acquired) = transport(
            vec![
                ScriptedConnection::failing(io::ErrorKind::PermissionDenied),
                ScriptedConnection::replying(OK_REPLY),
            ],
            3,
        );
        let err = run(&transport, Command::Check).await.unwrap_err();
        assert!(matches!(err, SpamcError::Io(_)));
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_error_is_fatal() {
        let (transport, acquired) = transport(Vec::new(), 3);
        let err = run(&transport, Command::Check).await.unwrap_err();
        assert!(matches!(err, SpamcError::Connect(_)));
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_fatal() {
        let (transport, acquired) = transport(
            vec![
                ScriptedConnection::replying(b"550 not spamd\r\n"),
                ScriptedConnection::replying(OK_REPLY),
            ],
            3,
        );
        let err = run(&transport, Command::Check).await.unwrap_err();
        assert!(matches!(
            err,
            SpamcError::Protocol(ProtocolError::UnrecognizedResponse { .. })
        ));
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transient_classification() {
        for kind in [
            io::ErrorKind::WouldBlock,
            io::ErrorKind::BrokenPipe,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted,
        ] {
            assert!(is_transient(&kind.into()), "{kind:?}");
        }
        assert!(!is_transient(&io::ErrorKind::TimedOut.into()));
        assert!(!is_transient(&io::ErrorKind::PermissionDenied.into()));
    }
}
