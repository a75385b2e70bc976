//! TLS server configuration for the secure SCPI port.

use std::sync::Arc;

use camino::Utf8Path;
use rustls::ServerConfig;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tracing::info;

use super::{LISTENER_TARGET, TlsError};

/// Reads the PEM certificate chain and private key and builds a server
/// configuration that does not ask clients for certificates.
pub(crate) fn load_server_config(
    cert_path: &Utf8Path,
    key_path: &Utf8Path,
) -> Result<Arc<ServerConfig>, TlsError> {
    let certificate_error = |source| TlsError::Certificate {
        path: cert_path.to_owned(),
        source,
    };
    let certificates = CertificateDer::pem_file_iter(cert_path)
        .map_err(certificate_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(certificate_error)?;
    if certificates.is_empty() {
        return Err(TlsError::NoCertificates {
            path: cert_path.to_owned(),
        });
    }
    let key = PrivateKeyDer::from_pem_file(key_path).map_err(|source| TlsError::PrivateKey {
        path: key_path.to_owned(),
        source,
    })?;

    let config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .and_then(|builder| {
                builder
                    .with_no_client_auth()
                    .with_single_cert(certificates, key)
            })
            .map_err(|source| TlsError::Config { source })?;
    info!(
        target: LISTENER_TARGET,
        certificate = %cert_path,
        "loaded TLS certificate"
    );
    Ok(Arc::new(config))
}
