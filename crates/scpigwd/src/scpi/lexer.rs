//! Byte stream to command line scanner.

use std::collections::VecDeque;
use std::io::{self, Read};

use scpi_config::READ_CHUNK_BYTES;
use thiserror::Error;

/// Longest command line accepted before the session is dropped.
pub(crate) const MAX_LINE_BYTES: usize = 64 * 1024;

const BACKSPACE: u8 = 0x08;

/// Errors that end a session's read loop.
#[derive(Debug, Error)]
pub enum LexError {
    /// The transport failed with a non-transient error.
    #[error("transport read failed: {0}")]
    Io(#[from] io::Error),
    /// A single line grew past the accepted size.
    #[error("command line exceeds {limit} bytes")]
    LineTooLong {
        /// Largest accepted line, in bytes.
        limit: usize,
    },
}

/// Splits a byte stream into normalised command lines.
///
/// CR and LF both terminate a line, so any mix of terminators works and
/// blank lines are dropped. Lines decoded from one read are queued and handed
/// out one at a time; the caller writes each response before asking for the
/// next line.
#[derive(Debug, Default)]
pub(crate) struct CommandReader {
    pending: Vec<u8>,
    lines: VecDeque<String>,
}

impl CommandReader {
    /// Returns the next command line, or `None` once the peer has closed.
    ///
    /// Timeouts and interrupted reads are retried; a partial line left when
    /// the peer closes is discarded.
    pub(crate) fn next_command<R: Read>(
        &mut self,
        source: &mut R,
    ) -> Result<Option<String>, LexError> {
        let mut chunk = [0_u8; READ_CHUNK_BYTES];
        loop {
            if let Some(line) = self.lines.pop_front() {
                return Ok(Some(line));
            }
            let count = match source.read(&mut chunk) {
                Ok(0) => return Ok(None),
                Ok(count) => count,
                Err(error) if is_transient(&error) => continue,
                Err(error) => return Err(error.into()),
            };
            self.feed(chunk.get(..count).unwrap_or_default())?;
        }
    }

    fn feed(&mut self, bytes: &[u8]) -> Result<(), LexError> {
        for &byte in bytes {
            match byte {
                b'\r' | b'\n' => self.finish_line(),
                BACKSPACE => {
                    self.pending.pop();
                }
                _ => {
                    self.pending.push(byte);
                    if self.pending.len() > MAX_LINE_BYTES {
                        self.pending.clear();
                        return Err(LexError::LineTooLong {
                            limit: MAX_LINE_BYTES,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn finish_line(&mut self) {
        let raw = String::from_utf8_lossy(&self.pending);
        let line = normalise(&raw);
        if !line.is_empty() {
            self.lines.push_back(line.to_owned());
        }
        self.pending.clear();
    }
}

/// Strips leading blanks and colons and trailing whitespace.
pub(crate) fn normalise(line: &str) -> &str {
    line.trim_start_matches([' ', '\t', ':']).trim_end()
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
