//! Connection abstractions shared by the listeners and the session layer.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use rustls::{ServerConnection, StreamOwned};
use strum::Display;
use tracing::debug;

use super::LISTENER_TARGET;

/// Transport a session arrived on, as reported by `SYSTem:SESSion?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub(crate) enum TransportKind {
    #[strum(serialize = "TCP")]
    Tcp,
    #[strum(serialize = "SSL")]
    Ssl,
}

/// Stream types accepted by the listeners.
pub(crate) enum ConnectionStream {
    Tcp(TcpStream),
    Tls(Box<StreamOwned<ServerConnection, TcpStream>>),
}

impl ConnectionStream {
    pub(crate) const fn kind(&self) -> TransportKind {
        match self {
            Self::Tcp(_) => TransportKind::Tcp,
            Self::Tls(_) => TransportKind::Ssl,
        }
    }

    fn socket(&self) -> &TcpStream {
        match self {
            Self::Tcp(stream) => stream,
            Self::Tls(stream) => stream.get_ref(),
        }
    }

    /// Drives the TLS handshake to completion; a no-op for plain TCP.
    pub(crate) fn complete_handshake(&mut self) -> io::Result<()> {
        if let Self::Tls(stream) = self {
            let StreamOwned { conn, sock } = stream.as_mut();
            while conn.is_handshaking() {
                conn.complete_io(sock)?;
            }
        }
        Ok(())
    }

    pub(crate) fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.socket().set_read_timeout(timeout)
    }

    /// Sends a TLS close notification where applicable, then shuts the socket
    /// down in both directions.
    ///
    /// A close notification that cannot be delivered is logged; the socket is
    /// shut down regardless.
    pub(crate) fn shutdown(&mut self) -> io::Result<()> {
        if let Self::Tls(stream) = self {
            stream.conn.send_close_notify();
            if let Err(error) = stream.flush() {
                debug!(
                    target: LISTENER_TARGET,
                    %error,
                    "TLS close notification not delivered"
                );
            }
        }
        self.socket().shutdown(Shutdown::Both)
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            Self::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            Self::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            Self::Tls(stream) => stream.flush(),
        }
    }
}

/// An accepted connection with its session id.
pub(crate) struct Connection {
    pub(crate) id: u64,
    pub(crate) peer: SocketAddr,
    pub(crate) stream: ConnectionStream,
}

/// Handles accepted connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection until it closes. Implementations should
    /// avoid panicking.
    fn handle(&self, connection: Connection);
}
