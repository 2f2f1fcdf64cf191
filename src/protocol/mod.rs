//! Wire protocol: commands, request encoding, response grammars.
//!
//! Requests and responses share an HTTP/1.0-like shape with CR LF line
//! separators:
//!
//! ```text
//! Request:                          Response:
//!   <VERB> SPAMC/1.5                  SPAMD/<ver> <code> <message>
//!   Content-length: <n>               [Spam: <bool> ; <score> / <base>]
//!   [User: <name>]                    [Content-length: <n>]
//!   [<Extra>: <value>]*
//!                                     <command-specific body>
//!   <body><CRLF>
//! ```
//!
//! Each command's reply body has its own grammar (comma-separated symbol
//! lists, scored-rule tables, rewritten messages, folded header blocks,
//! learn acknowledgements); [`decode`] selects the right one.

mod body;
mod command;
mod request;
mod response;
mod tell;

pub use body::Body;
pub use command::Command;
pub use request::RequestEncoder;
pub use response::{HeaderBlock, ReportEntry, SpamdResponse, decode};
pub use tell::{MessageClass, TellAction, TellDirective};
