//! Protocol constants for the spamd wire protocol.
//!
//! The wire-format values are fixed by the protocol and MUST NOT be
//! changed; the defaults mirror stock spamd deployments.

use std::time::Duration;

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Protocol identifier sent on every request line.
pub const PROTOCOL_VERSION: &str = "SPAMC/1.5";

/// Line terminator used throughout the protocol (never a bare newline).
pub const CRLF: &str = "\r\n";

/// Prefix of every response status line.
pub const RESPONSE_PREFIX: &str = "SPAMD/";

/// Terminator bytes reserved after the body; always counted in
/// `Content-length`, even for an empty body.
pub const TERMINATOR_LEN: u64 = 2;

// =============================================================================
// DEFAULT ENDPOINTS
// =============================================================================

/// Default spamd TCP port.
pub const DEFAULT_PORT: u16 = 783;

/// Default spamd Unix-domain socket path.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/spamassassin/spamd.sock";

// =============================================================================
// DEFAULT TRANSPORT POLICY
// =============================================================================

/// Default maximum connection attempts per call.
pub const DEFAULT_MAX_TRIES: u32 = 3;

/// Default fixed delay between retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default maximum pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 10;
