//! The spamd client façade: configuration, builder, and one operation per
//! protocol command.

#[cfg(unix)]
use std::path::PathBuf;
use std::time::Duration;

use crate::core::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_TRIES, DEFAULT_POOL_SIZE, DEFAULT_PORT,
    DEFAULT_RETRY_DELAY,
};
use crate::core::error::SpamcError;
use crate::protocol::{Body, Command, RequestEncoder, SpamdResponse, TellAction};
use crate::transport::{BoundedPool, ConnectionPool, ServerAddr, Transport};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Daemon endpoint.
    pub addr: ServerAddr,
    /// Identity sent in the `User` header, when set.
    pub user: Option<String>,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Per-operation I/O timeout; `None` waits indefinitely.
    pub io_timeout: Option<Duration>,
    /// Maximum connection attempts per call.
    pub max_tries: u32,
    /// Fixed delay between retries.
    pub retry_delay: Duration,
    /// Maximum pooled connections.
    pub pool_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: ServerAddr::Tcp {
                host: "127.0.0.1".to_string(),
                port: DEFAULT_PORT,
            },
            user: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: None,
            max_tries: DEFAULT_MAX_TRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

/// Builder for creating a [`SpamClient`] configuration.
#[derive(Debug, Default)]
pub struct SpamClientBuilder {
    config: ClientConfig,
}

impl SpamClientBuilder {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a TCP endpoint.
    pub fn tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.addr = ServerAddr::Tcp {
            host: host.into(),
            port,
        };
        self
    }

    /// Target a Unix-domain socket; stock daemons listen at
    /// [`DEFAULT_SOCKET_PATH`](crate::core::constants::DEFAULT_SOCKET_PATH).
    #[cfg(unix)]
    pub fn unix_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.addr = ServerAddr::Unix { path: path.into() };
        self
    }

    /// Identity sent in the `User` header.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.user = Some(user.into());
        self
    }

    /// Timeout for establishing a connection.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Per-operation I/O timeout.
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.config.io_timeout = Some(timeout);
        self
    }

    /// Maximum connection attempts per call.
    pub fn max_tries(mut self, max_tries: u32) -> Self {
        self.config.max_tries = max_tries;
        self
    }

    /// Fixed delay between retries.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Maximum pooled connections.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// A spamd protocol client.
///
/// One instance may be shared across tasks: calls are independent, each
/// holds at most one pooled connection, and the pool is the only shared
/// state.
///
/// # Example
///
/// ```ignore
/// let client = SpamClient::new(SpamClientBuilder::new().tcp("mail", 783).build());
///
/// let verdict = client.symbols(message).await?;
/// for rule in &verdict.symbols {
///     println!("hit: {rule}");
/// }
///
/// client.learn(message, "spam").await?;
/// ```
pub struct SpamClient<P: ConnectionPool = BoundedPool> {
    encoder: RequestEncoder,
    transport: Transport<P>,
}

impl SpamClient {
    /// Create a client backed by the default bounded pool. No connection
    /// is made until the first call.
    pub fn new(config: ClientConfig) -> Self {
        let pool = BoundedPool::new(
            config.addr.clone(),
            config.pool_size,
            config.connect_timeout,
            config.io_timeout,
        );
        Self::with_pool(config, pool)
    }
}

impl<P: ConnectionPool> SpamClient<P> {
    /// Create a client over a custom pool implementation.
    pub fn with_pool(config: ClientConfig, pool: P) -> Self {
        Self {
            encoder: RequestEncoder::new(config.user.clone()),
            transport: Transport::new(pool, config.max_tries, config.retry_delay),
        }
    }

    /// Check whether the message is spam.
    pub async fn check(&self, msg: impl Into<Body>) -> Result<SpamdResponse, SpamcError> {
        self.perform(Command::Check, msg.into(), Vec::new()).await
    }

    /// Check the message and return the list of rule names that matched.
    pub async fn symbols(&self, msg: impl Into<Body>) -> Result<SpamdResponse, SpamcError> {
        self.perform(Command::Symbols, msg.into(), Vec::new()).await
    }

    /// Check the message and return the scored-rule report.
    pub async fn report(&self, msg: impl Into<Body>) -> Result<SpamdResponse, SpamcError> {
        self.perform(Command::Report, msg.into(), Vec::new()).await
    }

    /// Like [`report`](Self::report), but the table is only returned when
    /// the message is spam.
    pub async fn report_ifspam(&self, msg: impl Into<Body>) -> Result<SpamdResponse, SpamcError> {
        self.perform(Command::ReportIfSpam, msg.into(), Vec::new())
            .await
    }

    /// Check the message and return it rewritten by the daemon.
    pub async fn process(&self, msg: impl Into<Body>) -> Result<SpamdResponse, SpamcError> {
        self.perform(Command::Process, msg.into(), Vec::new()).await
    }

    /// Check the message and return only its rewritten headers.
    pub async fn headers(&self, msg: impl Into<Body>) -> Result<SpamdResponse, SpamcError> {
        self.perform(Command::Headers, msg.into(), Vec::new()).await
    }

    /// Confirm the daemon is alive.
    pub async fn ping(&self) -> Result<SpamdResponse, SpamcError> {
        self.perform(Command::Ping, Body::Empty, Vec::new()).await
    }

    /// Relay a learning/training decision for the message.
    pub async fn tell(
        &self,
        msg: impl Into<Body>,
        action: TellAction,
    ) -> Result<SpamdResponse, SpamcError> {
        self.perform(Command::Tell, msg.into(), action.directive().headers())
            .await
    }

    /// Learn the message as `spam`/`ham`, or `forget` it.
    ///
    /// Any learn mode other than `forget` must parse as a
    /// [`MessageClass`](crate::protocol::MessageClass); invalid modes fail
    /// before any I/O.
    pub async fn learn(
        &self,
        msg: impl Into<Body>,
        learn_as: &str,
    ) -> Result<SpamdResponse, SpamcError> {
        if learn_as.eq_ignore_ascii_case("forget") {
            self.tell(msg, TellAction::Forget).await
        } else {
            self.tell(msg, TellAction::Learn(learn_as.parse()?)).await
        }
    }

    /// Tell the daemon the message is not spam.
    pub async fn revoke(&self, msg: impl Into<Body>) -> Result<SpamdResponse, SpamcError> {
        self.tell(msg, TellAction::Revoke).await
    }

    async fn perform(
        &self,
        command: Command,
        mut body: Body,
        extra_headers: Vec<(String, String)>,
    ) -> Result<SpamdResponse, SpamcError> {
        self.transport
            .send(&self.encoder, command, &mut body, &extra_headers)
            .await
    }
}
