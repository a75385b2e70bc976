//! Test helpers for the transport module.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use tempfile::TempDir;

use super::{Connection, ConnectionHandler};

/// Counts handled connections.
pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _connection: Connection) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Self-signed `localhost` certificate and key written to a scratch
/// directory.
pub(crate) struct TlsFixture {
    _dir: TempDir,
    root: Utf8PathBuf,
    certificate: CertificateDer<'static>,
}

impl TlsFixture {
    pub(crate) fn generate() -> Self {
        let generated = rcgen::generate_simple_self_signed(vec!["localhost".to_owned()])
            .expect("generate certificate");
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        std::fs::write(root.join("host.cert"), generated.cert.pem()).expect("write cert");
        std::fs::write(root.join("host.key"), generated.key_pair.serialize_pem())
            .expect("write key");
        Self {
            _dir: dir,
            root,
            certificate: generated.cert.der().clone(),
        }
    }

    pub(crate) fn dir(&self) -> &Utf8Path {
        &self.root
    }

    pub(crate) fn cert_path(&self) -> Utf8PathBuf {
        self.root.join("host.cert")
    }

    pub(crate) fn key_path(&self) -> Utf8PathBuf {
        self.root.join("host.key")
    }

    /// Client configuration trusting only this fixture's certificate.
    pub(crate) fn client_config(&self) -> Arc<ClientConfig> {
        let mut roots = RootCertStore::empty();
        roots
            .add(self.certificate.clone())
            .expect("trust fixture certificate");
        let config =
            ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
                .with_safe_default_protocol_versions()
                .expect("protocol versions")
                .with_root_certificates(roots)
                .with_no_client_auth();
        Arc::new(config)
    }

    /// Opens a TLS client connection to `addr` and completes the handshake.
    pub(crate) fn connect(&self, addr: SocketAddr) -> TlsClient {
        let socket = TcpStream::connect(addr).expect("connect tls client");
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("client read timeout");
        let name = ServerName::try_from("localhost").expect("server name");
        let connection =
            ClientConnection::new(self.client_config(), name).expect("client connection");
        let mut stream = StreamOwned::new(connection, socket);
        while stream.conn.is_handshaking() {
            stream
                .conn
                .complete_io(&mut stream.sock)
                .expect("tls handshake");
        }
        TlsClient(stream)
    }
}

/// Blocking TLS client used by tests.
pub(crate) struct TlsClient(StreamOwned<ClientConnection, TcpStream>);

impl Read for TlsClient {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Write for TlsClient {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
