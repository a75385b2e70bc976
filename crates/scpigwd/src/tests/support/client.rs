//! Line-oriented SCPI client over plain TCP or TLS.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::transport::TlsFixture;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

trait ClientStream: Read + Write + Send {}

impl<T: Read + Write + Send> ClientStream for T {}

/// Blocking client that writes CRLF-terminated commands and reads one
/// response line at a time.
pub(crate) struct ScpiClient {
    stream: Box<dyn ClientStream>,
}

impl ScpiClient {
    pub(crate) fn plain(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).expect("connect plain client");
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .expect("client read timeout");
        Self {
            stream: Box::new(stream),
        }
    }

    pub(crate) fn tls(addr: SocketAddr, fixture: &TlsFixture) -> Self {
        Self {
            stream: Box::new(fixture.connect(addr)),
        }
    }

    /// Sends one command line.
    pub(crate) fn send(&mut self, command: &str) {
        self.send_raw(format!("{command}\r\n").as_bytes());
    }

    /// Sends bytes exactly as given.
    pub(crate) fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).expect("write command");
        self.stream.flush().expect("flush command");
    }

    /// Reads one response line without its terminator, or `None` once the
    /// server has closed the connection.
    pub(crate) fn read_line(&mut self) -> Option<String> {
        let mut line = Vec::new();
        let mut byte = [0_u8; 1];
        loop {
            match self.stream.read(&mut byte) {
                Ok(0) => {
                    assert!(line.is_empty(), "connection closed mid-line");
                    return None;
                }
                Ok(_) => line.push(byte[0]),
                Err(error) if is_closed(&error) && line.is_empty() => return None,
                Err(error) => panic!("read response: {error}"),
            }
            if line.ends_with(b"\r\n") {
                line.truncate(line.len() - 2);
                return Some(String::from_utf8(line).expect("ascii response"));
            }
        }
    }

    /// Sends a command and returns its response line.
    pub(crate) fn query(&mut self, command: &str) -> String {
        self.send(command);
        self.read_line()
            .unwrap_or_else(|| panic!("no response to {command}"))
    }

    /// True once the server has shut the connection down.
    pub(crate) fn is_closed(&mut self) -> bool {
        self.read_line().is_none()
    }
}

fn is_closed(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
    )
}
