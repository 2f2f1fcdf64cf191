//! The connection capability consumed by the transport engine.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio::time::timeout;

use super::stream::SpamdStream;

/// One request/response channel to the daemon.
///
/// Exactly the capabilities the engine needs: write bytes, stream a
/// file-like source, read the full reply, close. Whether a released
/// connection goes back into circulation is the pool's call; a connection
/// only reports whether it could serve another request.
#[async_trait]
pub trait Connection: Send {
    /// Write all of `data`.
    async fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Stream `src` into the connection without buffering it whole.
    async fn send_stream(
        &mut self,
        src: &mut (dyn AsyncRead + Send + Unpin),
    ) -> io::Result<u64>;

    /// Read the complete response.
    async fn read(&mut self) -> io::Result<Vec<u8>>;

    /// Close the connection; it will not serve another request.
    async fn close(&mut self);

    /// Whether the connection could serve another request.
    fn reusable(&self) -> bool;
}

/// [`Connection`] over a [`SpamdStream`], with an optional per-operation
/// I/O timeout.
#[derive(Debug)]
pub struct StreamConnection {
    stream: SpamdStream,
    io_timeout: Option<Duration>,
    consumed: bool,
    closed: bool,
}

impl StreamConnection {
    /// Wrap a connected stream.
    pub fn new(stream: SpamdStream, io_timeout: Option<Duration>) -> Self {
        Self {
            stream,
            io_timeout,
            consumed: false,
            closed: false,
        }
    }
}

fn timed_out() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "i/o timed out")
}

#[async_trait]
impl Connection for StreamConnection {
    async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        match self.io_timeout {
            Some(limit) => timeout(limit, self.stream.write_all(data))
                .await
                .map_err(|_| timed_out())?,
            None => self.stream.write_all(data).await,
        }
    }

    async fn send_stream(
        &mut self,
        src: &mut (dyn AsyncRead + Send + Unpin),
    ) -> io::Result<u64> {
        match self.io_timeout {
            Some(limit) => timeout(limit, self.stream.copy_from(src))
                .await
                .map_err(|_| timed_out())?,
            None => self.stream.copy_from(src).await,
        }
    }

    async fn read(&mut self) -> io::Result<Vec<u8>> {
        // The daemon closes the stream after replying; reading to EOF
        // consumes the connection either way.
        self.consumed = true;
        match self.io_timeout {
            Some(limit) => timeout(limit, self.stream.read_to_end())
                .await
                .map_err(|_| timed_out())?,
            None => self.stream.read_to_end().await,
        }
    }

    async fn close(&mut self) {
        self.closed = true;
        let _ = self.stream.shutdown().await;
    }

    fn reusable(&self) -> bool {
        !self.closed && !self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::stream::ServerAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn connect_to(port: u16, io_timeout: Option<Duration>) -> StreamConnection {
        let addr = ServerAddr::Tcp {
            host: "127.0.0.1".to_string(),
            port,
        };
        let stream = SpamdStream::connect(&addr, Duration::from_secs(5))
            .await
            .unwrap();
        StreamConnection::new(stream, io_timeout)
    }

    #[tokio::test]
    async fn test_send_and_read() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            peer.read_exact(&mut buf).await.unwrap();
            peer.write_all(b"reply").await.unwrap();
            peer.shutdown().await.unwrap();
        });

        let mut conn = connect_to(port, None).await;
        assert!(conn.reusable());

        conn.send(b"hello").await.unwrap();
        let reply = conn.read().await.unwrap();
        assert_eq!(reply, b"reply");
        assert!(!conn.reusable());
    }

    #[tokio::test]
    async fn test_read_times_out_on_silent_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (peer, _) = listener.accept().await.unwrap();
            // Hold the connection open without ever replying.
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(peer);
        });

        let mut conn = connect_to(port, Some(Duration::from_millis(50))).await;
        let err = conn.read().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn test_closed_connection_is_not_reusable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let mut conn = connect_to(port, None).await;
        conn.close().await;
        assert!(!conn.reusable());
    }
}
