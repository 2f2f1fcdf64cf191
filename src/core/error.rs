//! Error types for the spamd client.

use std::io;

use thiserror::Error;

/// Errors raised while decoding a daemon response.
///
/// Only response-level faults live here; a failure to parse an individual
/// report row is row-local and never surfaces as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The daemon closed the connection without sending anything.
    #[error("empty response from spamd")]
    EmptyResponse,

    /// The status line does not match `SPAMD/<version> <code> <message>`.
    #[error("unrecognized spamd response: {line:?}")]
    UnrecognizedResponse {
        /// The offending status line.
        line: String,
    },
}

/// Top-level client errors.
///
/// Faults are classified at the transport layer: transient socket
/// conditions are absorbed up to the retry budget, everything else is
/// surfaced immediately. No partial response is ever returned alongside an
/// error.
#[derive(Debug, Error)]
pub enum SpamcError {
    /// Name resolution, connect, or connect-timeout failure. Never retried.
    #[error("connect error: {0}")]
    Connect(#[source] io::Error),

    /// Transient socket fault that survived the retry budget.
    #[error("transient i/o error after {attempts} attempt(s): {source}")]
    Transient {
        /// Connection attempts performed before giving up.
        attempts: u32,
        /// The last transient fault observed.
        #[source]
        source: io::Error,
    },

    /// Malformed or unrecognized daemon response.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Caller supplied an unsupported action or learn mode. Raised before
    /// any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Any other I/O failure. Not retried.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
