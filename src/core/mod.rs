//! Core error types and protocol constants shared by every layer.

pub mod constants;
pub mod error;

pub use error::{ProtocolError, SpamcError};
