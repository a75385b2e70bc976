//! Errors that stop the gateway from starting or shutting down cleanly.

use scpi_config::ConfigError;
use thiserror::Error;

use crate::scpi::TreeError;
use crate::telemetry::TelemetryError;
use crate::transport::{ListenerError, TlsError};

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the gateway.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry could not be installed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The handler table does not build into a command tree.
    #[error("invalid command table: {source}")]
    CommandTree {
        /// Underlying registration error.
        #[source]
        source: TreeError,
    },
    /// The TLS certificate or key could not be loaded.
    #[error("failed to load TLS material: {source}")]
    Tls {
        /// Underlying TLS error.
        #[source]
        source: TlsError,
    },
    /// A socket listener failed to bind or start.
    #[error("socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to await shutdown signal: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
}

impl From<ConfigError> for LaunchError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}

impl From<TelemetryError> for LaunchError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

impl From<TreeError> for LaunchError {
    fn from(source: TreeError) -> Self {
        Self::CommandTree { source }
    }
}

impl From<TlsError> for LaunchError {
    fn from(source: TlsError) -> Self {
        Self::Tls { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}
