//! Accept loops for the SCPI listeners.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::thread;
use std::time::Duration;

use rustls::{ServerConfig, ServerConnection, StreamOwned};
use tracing::{debug, info, warn};

use super::{
    Connection, ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError, TransportKind,
};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Session id source shared by every listener of the process.
#[derive(Debug)]
pub(crate) struct SessionIds(AtomicU64);

impl SessionIds {
    pub(crate) fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    /// Next id; strictly ascending across all listeners.
    pub(crate) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Listener bound to a TCP port, optionally wrapping connections in TLS.
#[derive(Debug)]
pub(crate) struct SocketListener {
    listener: TcpListener,
    tls: Option<Arc<ServerConfig>>,
}

impl SocketListener {
    /// Binds the plain SCPI port, moving to `fallback_port` when `port` is
    /// already taken.
    pub(crate) fn bind_plain(
        host: &str,
        port: u16,
        fallback_port: u16,
    ) -> Result<Self, ListenerError> {
        let listener = match bind_tcp(host, port) {
            Err(error) if error.is_addr_in_use() && fallback_port != port => {
                warn!(
                    target: LISTENER_TARGET,
                    port,
                    fallback_port,
                    "plain port in use, binding fallback"
                );
                bind_tcp(host, fallback_port)?
            }
            other => other?,
        };
        Ok(Self {
            listener,
            tls: None,
        })
    }

    /// Binds the TLS SCPI port.
    pub(crate) fn bind_tls(
        host: &str,
        port: u16,
        config: Arc<ServerConfig>,
    ) -> Result<Self, ListenerError> {
        Ok(Self {
            listener: bind_tcp(host, port)?,
            tls: Some(config),
        })
    }

    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }

    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
        ids: Arc<SessionIds>,
    ) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || run_accept_loop(&self, &shutdown_flag, &handler, &ids));
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to a background listener thread.
pub(crate) struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept loop to notice the shutdown flag and exit.
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        self.handle.take().map_or(Ok(()), |handle| {
            handle.join().map_err(|_| ListenerError::ThreadPanic)
        })
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &AtomicBool,
    handler: &Arc<dyn ConnectionHandler>,
    ids: &SessionIds,
) {
    let transport = if listener.tls.is_some() {
        TransportKind::Ssl
    } else {
        TransportKind::Tcp
    };
    listener.local_addr().map_or_else(
        || info!(target: LISTENER_TARGET, %transport, "socket listener active"),
        |addr| info!(target: LISTENER_TARGET, %addr, %transport, "socket listener active"),
    );
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match accept_connection(listener) {
            Ok(Some((stream, peer))) => {
                last_error = None;
                let connection = Connection {
                    id: ids.next(),
                    peer,
                    stream,
                };
                debug!(
                    target: LISTENER_TARGET,
                    session = connection.id,
                    %peer,
                    %transport,
                    "connection accepted"
                );
                let worker = Arc::clone(handler);
                thread::spawn(move || worker.handle(connection));
            }
            Ok(None) => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    info!(target: LISTENER_TARGET, %transport, "socket listener stopped");
}

fn accept_connection(
    listener: &SocketListener,
) -> Result<Option<(ConnectionStream, SocketAddr)>, io::Error> {
    match listener.listener.accept() {
        Ok((stream, peer)) => {
            stream.set_nonblocking(false)?;
            Ok(Some((wrap_stream(stream, listener.tls.as_ref())?, peer)))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

/// Wraps an accepted socket for its transport; the TLS handshake itself runs
/// on the session thread.
fn wrap_stream(
    stream: TcpStream,
    tls: Option<&Arc<ServerConfig>>,
) -> Result<ConnectionStream, io::Error> {
    let Some(config) = tls else {
        return Ok(ConnectionStream::Tcp(stream));
    };
    let connection = ServerConnection::new(Arc::clone(config)).map_err(io::Error::other)?;
    Ok(ConnectionStream::Tls(Box::new(StreamOwned::new(
        connection, stream,
    ))))
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}
