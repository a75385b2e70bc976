//! Response framing for the SCPI line protocol.

use std::io::{self, Write};

const TERMINATOR: &[u8] = b"\r\n";

/// Writes CRLF-terminated response lines.
pub(crate) struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    pub(crate) const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one line and flushes it so the client sees it before the next
    /// command is read.
    pub(crate) fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.write_all(TERMINATOR)?;
        self.writer.flush()
    }
}
