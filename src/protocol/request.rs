//! Request encoding: header block construction.

use crate::core::constants::{CRLF, PROTOCOL_VERSION, TERMINATOR_LEN};

use super::command::Command;

/// Builds request header blocks.
///
/// The protocol version and the optional user identity are fixed at
/// construction; everything else varies per call.
#[derive(Debug, Clone)]
pub struct RequestEncoder {
    protocol_version: &'static str,
    user: Option<String>,
}

impl RequestEncoder {
    /// Create an encoder, optionally carrying a user identity emitted as
    /// the `User` header on every request.
    pub fn new(user: Option<String>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            user,
        }
    }

    /// Content length advertised for a body of `body_len` bytes.
    ///
    /// The protocol reserves two trailing bytes for the terminator written
    /// after the body, so an empty body still advertises 2.
    pub fn content_length(body_len: u64) -> u64 {
        body_len + TERMINATOR_LEN
    }

    /// Encode the header block for `command`.
    ///
    /// Extra headers are emitted in order. A caller-supplied
    /// `Content-length` is skipped case-insensitively; the encoder is sole
    /// authority over that field. The returned block ends with the blank
    /// line separating headers from body, CR LF separated throughout.
    pub fn encode(
        &self,
        command: Command,
        content_length: u64,
        extra_headers: &[(String, String)],
    ) -> Vec<u8> {
        let mut lines = Vec::with_capacity(extra_headers.len() + 5);
        lines.push(format!("{} {}", command.verb(), self.protocol_version));
        lines.push(format!("Content-length: {content_length}"));
        if let Some(user) = &self.user {
            lines.push(format!("User: {user}"));
        }
        for (key, value) in extra_headers {
            if key.eq_ignore_ascii_case("content-length") {
                continue;
            }
            lines.push(format!("{key}: {value}"));
        }
        lines.push(String::new());
        lines.push(String::new());
        lines.join(CRLF).into_bytes()
    }
}
