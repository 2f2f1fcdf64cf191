//! Response decoding: the per-command body grammars.
//!
//! Every response opens with the status line `SPAMD/<version> <code>
//! <message>`; a response that does not is rejected outright. Later lines
//! may carry the spam marker `Spam: <bool> ; <score> / <baseScore>`. What
//! follows the blank separator line depends on the command: a
//! comma-separated symbol list, a scored-rule table, the rewritten message,
//! a folded header block, or learn acknowledgement markers. Each grammar is
//! a small dedicated parser; a row that fails its grammar is dropped
//! without aborting the decode.

use crate::core::constants::{CRLF, RESPONSE_PREFIX};
use crate::core::error::ProtocolError;

use super::command::Command;

/// Decoded spamd response.
///
/// Fields not meaningful for the invoked command keep their default value;
/// the absence of an optional field on the wire is not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpamdResponse {
    /// Daemon protocol version from the status line.
    pub version: String,
    /// Protocol status code.
    pub code: u32,
    /// Status text, e.g. `EX_OK` or `PONG`.
    pub message: String,
    /// Whether the daemon classified the message as spam.
    pub is_spam: bool,
    /// Score assigned to the message.
    pub score: f32,
    /// Threshold the score is judged against.
    pub base_score: f32,
    /// Rule names hit (SYMBOLS).
    pub symbols: Vec<String>,
    /// Scored-rule rows (REPORT / REPORT_IFSPAM).
    pub report: Vec<ReportEntry>,
    /// Rewritten message headers (HEADERS).
    pub headers: HeaderBlock,
    /// Whether the daemon set the requested classification (TELL).
    pub did_set: bool,
    /// Whether the daemon removed the requested classification (TELL).
    pub did_remove: bool,
    /// Rewritten message (PROCESS); present even when empty.
    pub body: String,
}

/// One scored-rule row of a REPORT response.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    /// Points the rule contributed to the total score.
    pub score: f32,
    /// Rule name.
    pub name: String,
    /// Human-readable description, single-spaced after unfolding.
    pub description: String,
    /// Test-marker token as encoded by the daemon (`BODY`, `HEADER`, ...);
    /// empty when the row carries none.
    pub test_type: String,
}

/// Rewritten header entries from a HEADERS response.
///
/// Entries keep wire order; folded continuations (lines starting with a
/// tab) are merged verbatim into their parent entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    entries: Vec<String>,
}

impl HeaderBlock {
    /// Raw header entries in wire order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Whether no headers were returned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the first header named `name`, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| {
            let (key, value) = entry.split_once(':')?;
            if key.eq_ignore_ascii_case(name) {
                Some(value.trim_start())
            } else {
                None
            }
        })
    }

    fn push_line(&mut self, line: &str) {
        if line.starts_with('\t') {
            // Folded header: continuation of the previous entry.
            if let Some(last) = self.entries.last_mut() {
                last.push_str(line);
            }
        } else {
            self.entries.push(line.to_string());
        }
    }
}

/// Decode a raw response to `command`.
///
/// The status line is mandatory and its failure is fatal; everything
/// after it is scanned leniently.
pub fn decode(command: Command, raw: &[u8]) -> Result<SpamdResponse, ProtocolError> {
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<&str> = text.split(CRLF).collect();

    let mut response = SpamdResponse::default();
    let status = lines.first().copied().unwrap_or_default();
    (response.version, response.code, response.message) = parse_status_line(status)?;

    for line in &lines[1..] {
        if let Some((is_spam, score, base_score)) = parse_spam_status(line) {
            response.is_spam = is_spam;
            response.score = score;
            response.base_score = base_score;
        }
    }

    let body = body_lines(&lines);
    match command {
        Command::Symbols => response.symbols = parse_symbols(body),
        Command::Report | Command::ReportIfSpam => response.report = parse_report(body),
        Command::Process => response.body = parse_process(body),
        Command::Headers => response.headers = parse_header_block(body),
        Command::Tell => {
            // The acknowledgement markers arrive before the blank line, so
            // scan everything past the status line.
            for line in &lines[1..] {
                if line.starts_with("DidSet:") {
                    response.did_set = true;
                }
                if line.starts_with("DidRemove:") {
                    response.did_remove = true;
                }
            }
        }
        Command::Check | Command::Ping => {}
    }

    Ok(response)
}

/// Parse `SPAMD/<version> <code> <message>` into its three fields.
fn parse_status_line(line: &str) -> Result<(String, u32, String), ProtocolError> {
    if line.is_empty() {
        return Err(ProtocolError::EmptyResponse);
    }
    let malformed = || ProtocolError::UnrecognizedResponse {
        line: line.to_string(),
    };

    let rest = line.strip_prefix(RESPONSE_PREFIX).ok_or_else(malformed)?;
    let (version, rest) = rest.split_once(' ').ok_or_else(malformed)?;
    if version.is_empty() || !version.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(malformed());
    }
    let (code, message) = rest.split_once(' ').ok_or_else(malformed)?;
    let code: u32 = code.parse().map_err(|_| malformed())?;

    Ok((version.to_string(), code, message.to_string()))
}

/// Parse the `Spam: <bool> ; <score> / <baseScore>` marker line.
///
/// Booleans accept case-insensitive `true`/`yes` as true. Returns `None`
/// for anything that does not match; the marker is optional.
fn parse_spam_status(line: &str) -> Option<(bool, f32, f32)> {
    let rest = line.strip_prefix("Spam:")?;
    let (flag, scores) = rest.split_once(';')?;
    let (score, base_score) = scores.split_once('/')?;

    let flag = flag.trim();
    let is_spam = flag.eq_ignore_ascii_case("true") || flag.eq_ignore_ascii_case("yes");
    let score: f32 = score.trim().parse().ok()?;
    let base_score: f32 = base_score.trim().parse().ok()?;

    Some((is_spam, score, base_score))
}

/// Lines after the blank separator between response headers and body.
fn body_lines<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    match lines.iter().position(|line| line.is_empty()) {
        Some(blank) => &lines[blank + 1..],
        None => &[],
    }
}

/// SYMBOLS body: comma-separated rule names, tolerant of trailing commas.
fn parse_symbols(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// REPORT body: a fixed-width table of scored rules.
///
/// A line whose first token is a numeric score opens a logical row; any
/// other line folds into the open row (wrapped descriptions). Lines seen
/// before the first row open, like the table banner and divider, are
/// dropped.
fn parse_report(lines: &[&str]) -> Vec<ReportEntry> {
    let mut rows: Vec<String> = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if starts_score(trimmed) {
            rows.push(trimmed.to_string());
        } else if let Some(open) = rows.last_mut() {
            open.push(' ');
            open.push_str(trimmed);
        }
    }
    rows.iter().filter_map(|row| parse_report_row(row)).collect()
}

fn starts_score(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|token| token.parse::<f32>().is_ok())
}

/// Split one folded row into `(score, name, description, test_type)`.
///
/// Repeated whitespace is collapsed first, so the fixed-width alignment
/// carries no meaning here. Rows that fail the grammar yield `None` and
/// are dropped by the caller.
fn parse_report_row(row: &str) -> Option<ReportEntry> {
    let collapsed = row.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut fields = collapsed.splitn(3, ' ');

    let score: f32 = fields.next()?.parse().ok()?;
    let name = fields.next()?;
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let rest = fields.next().unwrap_or_default();

    let (test_type, description) = match rest.split_once(' ') {
        Some((marker, tail)) if is_type_marker(marker) => {
            (marker.trim_end_matches(':').to_string(), tail.to_string())
        }
        _ if is_type_marker(rest) => (rest.trim_end_matches(':').to_string(), String::new()),
        _ => (String::new(), rest.to_string()),
    };

    Some(ReportEntry {
        score,
        name: name.to_string(),
        description,
        test_type,
    })
}

/// An all-uppercase `MARKER:` token naming the kind of test.
fn is_type_marker(token: &str) -> bool {
    token.len() > 1
        && token.ends_with(':')
        && token[..token.len() - 1]
            .chars()
            .all(|c| c.is_ascii_uppercase())
}

/// PROCESS body: the rewritten message, terminated with CR LF.
fn parse_process(lines: &[&str]) -> String {
    let mut body = lines.concat();
    body.push_str(CRLF);
    body
}

/// HEADERS body: one entry per line, tab-folded continuations merged.
fn parse_header_block(lines: &[&str]) -> HeaderBlock {
    let mut block = HeaderBlock::default();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        block.push_line(line);
    }
    block
}
