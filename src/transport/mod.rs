//! Transport layer: streams, pooling, and the send/retry engine.
//!
//! This layer owns the request/response cycle and connection lifecycle:
//!
//! - **Streams**: [`SpamdStream`] over TCP or a Unix-domain socket
//! - **Connections**: the [`Connection`] capability consumed by the engine
//! - **Pooling**: the [`ConnectionPool`] capability with [`BoundedPool`]
//!   as the default implementation
//! - **Retry**: [`Transport`] classifies faults into retryable vs. fatal
//!   and absorbs transient socket faults up to a bounded budget
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Client Façade                │
//! ├─────────────────────────────────────────┤
//! │          Transport Layer                │  ← This module
//! │   pooling, retry, fault classification  │
//! ├─────────────────────────────────────────┤
//! │          TCP / Unix socket              │
//! └─────────────────────────────────────────┘
//! ```

mod connection;
mod engine;
mod pool;
mod stream;

pub use connection::{Connection, StreamConnection};
pub use engine::Transport;
pub use pool::{BoundedPool, ConnectionPool, PooledConnection};
pub use stream::{ServerAddr, SpamdStream};
