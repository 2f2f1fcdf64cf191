//! TELL directives: the learning/training header sets.

use std::str::FromStr;

use crate::core::error::SpamcError;

/// Classification a message is learned under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    /// Learn the message as spam.
    Spam,
    /// Learn the message as ham.
    Ham,
}

impl MessageClass {
    /// Wire value for the `Message-class` header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Ham => "ham",
        }
    }
}

impl FromStr for MessageClass {
    type Err = SpamcError;

    /// Case-insensitive; `notspam` and `not_spam` are accepted as aliases
    /// for `ham`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spam" => Ok(Self::Spam),
            "ham" | "notspam" | "not_spam" => Ok(Self::Ham),
            other => Err(SpamcError::InvalidArgument(format!(
                "unsupported learn mode {other:?}, expected spam or ham"
            ))),
        }
    }
}

/// What a TELL command asks the daemon to do with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TellAction {
    /// Learn the message into the local database.
    Learn(MessageClass),
    /// Forget a previously learned message.
    Forget,
    /// Report the message as spam, locally and remotely.
    Report,
    /// Revoke a remote spam report.
    Revoke,
}

impl TellAction {
    /// Parse the string form `(action, learn_as)`.
    ///
    /// `action` must be one of `learn`, `forget`, `report`, `revoke`
    /// (case-insensitive); `learn` additionally requires a learn mode.
    /// Rejections happen here, before any I/O.
    pub fn parse(action: &str, learn_as: Option<&str>) -> Result<Self, SpamcError> {
        match action.to_ascii_lowercase().as_str() {
            "learn" => match learn_as {
                Some(mode) => Ok(Self::Learn(mode.parse()?)),
                None => Err(SpamcError::InvalidArgument(
                    "learn requires a learn mode".to_string(),
                )),
            },
            "forget" => Ok(Self::Forget),
            "report" => Ok(Self::Report),
            "revoke" => Ok(Self::Revoke),
            other => Err(SpamcError::InvalidArgument(format!(
                "unsupported tell action {other:?}"
            ))),
        }
    }

    /// The header set this action sends with TELL.
    pub fn directive(self) -> TellDirective {
        match self {
            Self::Learn(class) => TellDirective {
                message_class: Some(class),
                set: Some("local"),
                remove: None,
            },
            Self::Forget => TellDirective {
                message_class: None,
                set: None,
                remove: Some("local"),
            },
            Self::Report => TellDirective {
                message_class: Some(MessageClass::Spam),
                set: Some("local, remote"),
                remove: None,
            },
            Self::Revoke => TellDirective {
                message_class: Some(MessageClass::Ham),
                set: None,
                remove: Some("remote"),
            },
        }
    }
}

/// The `Message-class`/`Set`/`Remove` header set for one TELL command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TellDirective {
    /// `Message-class` header value, when present.
    pub message_class: Option<MessageClass>,
    /// `Set` header value, when present.
    pub set: Option<&'static str>,
    /// `Remove` header value, when present.
    pub remove: Option<&'static str>,
}

impl TellDirective {
    /// Render as request headers, in wire order.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(class) = self.message_class {
            headers.push(("Message-class".to_string(), class.as_str().to_string()));
        }
        if let Some(set) = self.set {
            headers.push(("Set".to_string(), set.to_string()));
        }
        if let Some(remove) = self.remove {
            headers.push(("Remove".to_string(), remove.to_string()));
        }
        headers
    }
}
