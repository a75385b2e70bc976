//! Error types for listener and TLS setup.

use std::io;
use std::net::SocketAddr;

use camino::Utf8PathBuf;
use rustls::pki_types::pem;
use thiserror::Error;

/// Errors surfaced while binding or running a socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The bind host could not be resolved.
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        /// Host as configured.
        host: String,
        /// Port as configured.
        port: u16,
        /// Resolver failure.
        #[source]
        source: io::Error,
    },
    /// The bind host resolved to nothing.
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty {
        /// Host as configured.
        host: String,
        /// Port as configured.
        port: u16,
    },
    /// Binding the listening socket failed.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Socket error.
        #[source]
        source: io::Error,
    },
    /// The listening socket could not be switched to non-blocking mode.
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        /// Socket error.
        #[source]
        source: io::Error,
    },
    /// The accept thread panicked before it could be joined.
    #[error("listener thread panicked")]
    ThreadPanic,
}

impl ListenerError {
    /// True when the bind failed because another socket holds the port.
    pub(crate) fn is_addr_in_use(&self) -> bool {
        matches!(self, Self::BindTcp { source, .. } if source.kind() == io::ErrorKind::AddrInUse)
    }
}

/// Errors raised while loading the TLS certificate and key.
#[derive(Debug, Error)]
pub enum TlsError {
    /// The certificate chain could not be read.
    #[error("failed to read certificate {path}: {source}")]
    Certificate {
        /// Certificate file.
        path: Utf8PathBuf,
        /// PEM decoding failure.
        #[source]
        source: pem::Error,
    },
    /// The certificate file parsed but held no certificates.
    #[error("certificate file {path} holds no certificates")]
    NoCertificates {
        /// Certificate file.
        path: Utf8PathBuf,
    },
    /// The private key could not be read.
    #[error("failed to read private key {path}: {source}")]
    PrivateKey {
        /// Key file.
        path: Utf8PathBuf,
        /// PEM decoding failure.
        #[source]
        source: pem::Error,
    },
    /// rustls rejected the certificate and key pair.
    #[error("invalid TLS configuration: {source}")]
    Config {
        /// rustls failure.
        #[source]
        source: rustls::Error,
    },
}
