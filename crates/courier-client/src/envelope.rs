//! JSONL framing for a single exchange.
//!
//! Each direction carries exactly one envelope serialised as one line of
//! JSON terminated by `\n`.

use std::io::{self, Write};

use courier_pipeline::Headers;
use courier_protocol::WireMessage;
use serde::{Deserialize, Serialize};

/// Headers plus an optional encoded command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Ordered header pairs.
    #[serde(default)]
    pub headers: Headers,
    /// Encoded command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<WireMessage>,
}

impl Envelope {
    /// Creates an envelope from its parts.
    #[must_use]
    pub const fn new(headers: Headers, body: Option<WireMessage>) -> Self {
        Self { headers, body }
    }

    /// Writes the envelope as a single JSONL record and flushes.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when serialisation or the write fails.
    pub fn write_jsonl(&self, writer: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer(&mut *writer, self).map_err(io::Error::other)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    /// Parses one JSONL record.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the line is not an envelope.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end())
    }
}
