//! Connection pooling.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::core::error::SpamcError;

use super::connection::{Connection, StreamConnection};
use super::stream::{ServerAddr, SpamdStream};

/// Source of pooled connections.
///
/// `acquire` may block waiting for a free slot or while establishing a
/// new connection; failing to reach the daemon at all surfaces as
/// [`SpamcError::Connect`]. Implementations own their thread safety; the
/// engine never shares one connection across in-flight calls.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// Connection type handed out by this pool.
    type Conn: Connection;

    /// Acquire a connection, establishing a new one if needed.
    async fn acquire(&self) -> Result<Self::Conn, SpamcError>;

    /// Return a connection. `reusable` is false when the caller knows the
    /// connection was left in an indeterminate state.
    async fn release(&self, conn: Self::Conn, reusable: bool);
}

/// Bounded pool of connections to a single spamd endpoint.
///
/// At most `pool_size` connections exist at once, counting both idle and
/// checked-out ones; `acquire` waits for a slot when the pool is at
/// capacity. Released connections return to the idle list only while
/// still reusable.
pub struct BoundedPool {
    addr: ServerAddr,
    connect_timeout: Duration,
    io_timeout: Option<Duration>,
    slots: Arc<Semaphore>,
    idle: Mutex<Vec<PooledConnection>>,
}

impl BoundedPool {
    /// Create a pool of at most `pool_size` connections to `addr`.
    pub fn new(
        addr: ServerAddr,
        pool_size: usize,
        connect_timeout: Duration,
        io_timeout: Option<Duration>,
    ) -> Self {
        Self {
            addr,
            connect_timeout,
            io_timeout,
            slots: Arc::new(Semaphore::new(pool_size.max(1))),
            idle: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ConnectionPool for BoundedPool {
    type Conn = PooledConnection;

    async fn acquire(&self) -> Result<PooledConnection, SpamcError> {
        if let Some(conn) = self.idle.lock().await.pop() {
            debug!(addr = %self.addr, "reusing pooled connection");
            return Ok(conn);
        }

        let slot = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| SpamcError::Connect(io::Error::other("connection pool closed")))?;

        debug!(addr = %self.addr, "opening connection");
        let stream = SpamdStream::connect(&self.addr, self.connect_timeout)
            .await
            .map_err(SpamcError::Connect)?;

        Ok(PooledConnection {
            inner: StreamConnection::new(stream, self.io_timeout),
            _slot: slot,
        })
    }

    async fn release(&self, conn: PooledConnection, reusable: bool) {
        if reusable && conn.reusable() {
            self.idle.lock().await.push(conn);
        }
        // Dropping a connection frees its slot with it.
    }
}

/// A [`StreamConnection`] bound to its pool slot.
///
/// The slot is held for the connection's whole lifetime, idle included,
/// and frees itself when the connection drops.
#[derive(Debug)]
pub struct PooledConnection {
    inner: StreamConnection,
    _slot: OwnedSemaphorePermit,
}

#[async_trait]
impl Connection for PooledConnection {
    async fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.send(data).await
    }

    async fn send_stream(
        &mut self,
        src: &mut (dyn AsyncRead + Send + Unpin),
    ) -> io::Result<u64> {
        self.inner.send_stream(src).await
    }

    async fn read(&mut self) -> io::Result<Vec<u8>> {
        self.inner.read().await
    }

    async fn close(&mut self) {
        self.inner.close().await;
    }

    fn reusable(&self) -> bool {
        self.inner.reusable()
    }
}
