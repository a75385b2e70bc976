//! Compiled-in defaults for the gateway.

use std::time::Duration;

use camino::Utf8PathBuf;

/// Default host of the instrument engine when no argument is given.
pub const DEFAULT_ENGINE_HOST: &str = "localhost";

/// Default TCP port of the engine RPC service.
pub const DEFAULT_ENGINE_PORT: u16 = 50051;

/// Address both SCPI listeners bind to.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Plain-text SCPI port.
pub const DEFAULT_PLAIN_PORT: u16 = 8090;

/// Plain-text port used when [`DEFAULT_PLAIN_PORT`] is already bound by a
/// native service on the same host.
pub const DEFAULT_FALLBACK_PORT: u16 = 8092;

/// TLS SCPI port.
pub const DEFAULT_TLS_PORT: u16 = 8091;

/// Server certificate file name.
pub const DEFAULT_CERT_FILE: &str = "host.cert";

/// Server private key file name.
pub const DEFAULT_KEY_FILE: &str = "host.key";

/// Persisted auto-login record.
pub const DEFAULT_AUTOLOGIN_FILE: &str = "autologin.json";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Read timeout applied to session sockets; expiry is retried.
pub const SESSION_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Size of a single transport read.
pub const READ_CHUNK_BYTES: usize = 256;

/// Owned engine host, for the configuration loader.
#[must_use]
pub fn default_engine_host() -> String {
    DEFAULT_ENGINE_HOST.to_owned()
}

/// Owned bind host, for the configuration loader.
#[must_use]
pub fn default_bind_host() -> String {
    DEFAULT_BIND_HOST.to_owned()
}

/// Owned log filter, for the configuration loader.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Certificate path relative to the working directory.
#[must_use]
pub fn default_cert_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_CERT_FILE)
}

/// Private key path relative to the working directory.
#[must_use]
pub fn default_key_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_KEY_FILE)
}

/// Auto-login record path relative to the working directory.
#[must_use]
pub fn default_autologin_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_AUTOLOGIN_FILE)
}
