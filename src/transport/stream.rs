//! Socket streams for spamd endpoints.

use std::fmt;
use std::io;
#[cfg(unix)]
use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;
use tokio::time::timeout;

/// Address of a spamd endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAddr {
    /// TCP endpoint; the host may be a name or an IP address.
    Tcp {
        /// Host name or address; resolved at connect time.
        host: String,
        /// TCP port.
        port: u16,
    },
    /// Unix-domain socket endpoint.
    #[cfg(unix)]
    Unix {
        /// Socket path.
        path: PathBuf,
    },
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(f, "{host}:{port}"),
            #[cfg(unix)]
            Self::Unix { path } => write!(f, "{}", path.display()),
        }
    }
}

/// A connected stream to a spamd endpoint.
#[derive(Debug)]
pub enum SpamdStream {
    /// Plain TCP stream.
    Tcp(TcpStream),
    /// Unix-domain stream.
    #[cfg(unix)]
    Unix(UnixStream),
}

impl SpamdStream {
    /// Connect to `addr`, failing once `connect_timeout` elapses.
    ///
    /// Name resolution happens inside the connect and shares the timeout.
    pub async fn connect(addr: &ServerAddr, connect_timeout: Duration) -> io::Result<Self> {
        let connecting = async {
            match addr {
                ServerAddr::Tcp { host, port } => {
                    let stream = TcpStream::connect((host.as_str(), *port)).await?;
                    Ok(Self::Tcp(stream))
                }
                #[cfg(unix)]
                ServerAddr::Unix { path } => {
                    let stream = UnixStream::connect(path).await?;
                    Ok(Self::Unix(stream))
                }
            }
        };
        timeout(connect_timeout, connecting)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))?
    }

    /// Write all of `data`.
    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.write_all(data).await,
            #[cfg(unix)]
            Self::Unix(stream) => stream.write_all(data).await,
        }
    }

    /// Stream `src` into the socket, returning the bytes copied.
    pub async fn copy_from(
        &mut self,
        src: &mut (dyn AsyncRead + Send + Unpin),
    ) -> io::Result<u64> {
        match self {
            Self::Tcp(stream) => tokio::io::copy(src, stream).await,
            #[cfg(unix)]
            Self::Unix(stream) => tokio::io::copy(src, stream).await,
        }
    }

    /// Read until the peer closes the stream.
    pub async fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        match self {
            Self::Tcp(stream) => stream.read_to_end(&mut data).await?,
            #[cfg(unix)]
            Self::Unix(stream) => stream.read_to_end(&mut data).await?,
        };
        Ok(data)
    }

    /// Shut down the stream.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.shutdown().await,
            #[cfg(unix)]
            Self::Unix(stream) => stream.shutdown().await,
        }
    }
}
