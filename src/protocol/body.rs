//! Message payloads handed to a command.

use std::io;

use tokio::fs::File;
use tokio::io::AsyncSeekExt;

/// Payload for a spamd command.
///
/// In-memory bytes are written in one piece; files are streamed without
/// full buffering and rewound before every transmission attempt. The byte
/// length of a file comes from its metadata, never from reading it.
#[derive(Debug)]
pub enum Body {
    /// No payload (PING).
    Empty,
    /// In-memory message bytes.
    Bytes(Vec<u8>),
    /// File-backed message, streamed.
    File(File),
}

impl Body {
    /// Body byte length, excluding the reserved terminator bytes.
    pub async fn byte_len(&self) -> io::Result<u64> {
        match self {
            Self::Empty => Ok(0),
            Self::Bytes(bytes) => Ok(bytes.len() as u64),
            Self::File(file) => Ok(file.metadata().await?.len()),
        }
    }

    /// Rewind a file body to the start before (re)sending.
    pub async fn rewind(&mut self) -> io::Result<()> {
        if let Self::File(file) = self {
            file.rewind().await?;
        }
        Ok(())
    }
}

impl From<&str> for Body {
    fn from(msg: &str) -> Self {
        Self::Bytes(msg.as_bytes().to_vec())
    }
}

impl From<String> for Body {
    fn from(msg: String) -> Self {
        Self::Bytes(msg.into_bytes())
    }
}

impl From<&[u8]> for Body {
    fn from(msg: &[u8]) -> Self {
        Self::Bytes(msg.to_vec())
    }
}

impl From<Vec<u8>> for Body {
    fn from(msg: Vec<u8>) -> Self {
        Self::Bytes(msg)
    }
}

impl From<File> for Body {
    fn from(file: File) -> Self {
        Self::File(file)
    }
}
