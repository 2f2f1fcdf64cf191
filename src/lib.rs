//! # spamc-client
//!
//! Client library for the spamd line-oriented text protocol spoken by
//! SpamAssassin's `spamd`. It submits email messages for spam analysis and
//! relays learning/training decisions, over TCP or a Unix-domain socket:
//!
//! - **Commands**: CHECK, SYMBOLS, REPORT, REPORT_IFSPAM, PROCESS, HEADERS,
//!   PING, TELL (learn/forget/report/revoke)
//! - **Pooling**: bounded connection pool, safe to share across tasks
//! - **Retry**: bounded fixed-delay retry for transient socket faults,
//!   with fatal faults surfaced immediately
//! - **Decoding**: each command's differently shaped reply body is parsed
//!   by a dedicated grammar into one structured [`SpamdResponse`]
//!
//! ## Modules
//!
//! - [`core`]: error taxonomy and protocol constants
//! - [`protocol`]: commands, request encoding, response grammars
//! - [`transport`]: streams, pooling, and the send/retry engine
//! - [`client`]: the high-level [`SpamClient`] API
//!
//! ## Example Usage
//!
//! ```no_run
//! use spamc_client::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SpamcError> {
//!     let config = SpamClientBuilder::new()
//!         .tcp("127.0.0.1", 783)
//!         .user("exim")
//!         .build();
//!     let client = SpamClient::new(config);
//!
//!     let verdict = client.check("Subject: test\r\n\r\nHello\r\n").await?;
//!     println!("spam: {}, score: {}", verdict.is_spam, verdict.score);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Core module (errors and constants)
pub mod core;

// Wire protocol (commands, request encoding, response grammars)
pub mod protocol;

// Transport layer (streams, pooling, send/retry engine)
pub mod transport;

// High-level client API
pub mod client;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::client::{ClientConfig, SpamClient, SpamClientBuilder};
    pub use crate::core::constants;
    pub use crate::core::error::{ProtocolError, SpamcError};
    pub use crate::protocol::{
        Body, Command, HeaderBlock, MessageClass, ReportEntry, RequestEncoder, SpamdResponse,
        TellAction, TellDirective,
    };
    pub use crate::transport::{
        BoundedPool, Connection, ConnectionPool, ServerAddr, SpamdStream, Transport,
    };
}

// Re-export commonly used items at crate root
pub use crate::client::{ClientConfig, SpamClient, SpamClientBuilder};
pub use crate::core::error::{ProtocolError, SpamcError};
pub use crate::protocol::{Body, Command, MessageClass, ReportEntry, SpamdResponse, TellAction};
pub use crate::transport::ServerAddr;
