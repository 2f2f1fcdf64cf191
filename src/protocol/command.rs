//! Command table for the spamd protocol.

use std::fmt;

/// A spamd protocol command.
///
/// Each command knows its wire verb, whether it carries a message body,
/// whether extra request headers are permitted, and whether a transient
/// fault may be retried without risking a duplicated side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Score the message and report whether it is spam.
    Check,
    /// Like CHECK, plus the list of rule names that matched.
    Symbols,
    /// Like CHECK, plus the scored-rule report table.
    Report,
    /// Like REPORT, but the table is only returned for spam.
    ReportIfSpam,
    /// Return the message rewritten by the daemon.
    Process,
    /// Return only the rewritten message headers, not the body.
    Headers,
    /// Liveness probe; carries no body.
    Ping,
    /// Relay a learning/training directive.
    Tell,
}

impl Command {
    /// Wire verb sent on the request line.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Check => "CHECK",
            Self::Symbols => "SYMBOLS",
            Self::Report => "REPORT",
            Self::ReportIfSpam => "REPORT_IFSPAM",
            Self::Process => "PROCESS",
            Self::Headers => "HEADERS",
            Self::Ping => "PING",
            Self::Tell => "TELL",
        }
    }

    /// Whether the command sends a message body.
    pub fn carries_body(self) -> bool {
        !matches!(self, Self::Ping)
    }

    /// Whether extra request headers are permitted.
    pub fn allows_extra_headers(self) -> bool {
        matches!(self, Self::Tell)
    }

    /// Whether a transient fault may be retried.
    ///
    /// TELL has a server-side side effect: resubmitting a learn directive
    /// could double-count it.
    pub fn retry_safe(self) -> bool {
        !matches!(self, Self::Tell)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}
