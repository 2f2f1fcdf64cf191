//! High-level spamd client API.

#[allow(clippy::module_inception)]
mod client;

pub use client::*;
