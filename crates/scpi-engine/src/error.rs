//! Engine failure conditions.

use std::io;

use thiserror::Error;

/// Errors surfaced by an [`InstrumentEngine`](crate::InstrumentEngine).
///
/// Handlers do not distinguish between these beyond choosing a SCPI error
/// code; the variants exist for logging.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No socket address could be resolved for the engine.
    #[error("failed to resolve engine address {endpoint}: {source}")]
    Resolve {
        /// Address that failed to resolve.
        endpoint: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// The engine could not be reached.
    #[error("failed to connect to engine at {endpoint}: {source}")]
    Connect {
        /// Address that refused or timed out.
        endpoint: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// Reading from or writing to the engine failed.
    #[error("engine I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The engine closed the connection mid-call.
    #[error("engine closed the connection")]
    Closed,
    /// A message could not be encoded or decoded.
    #[error("malformed engine message: {0}")]
    Protocol(#[from] serde_json::Error),
    /// The engine refused the supplied credentials.
    #[error("engine rejected the credentials")]
    Rejected,
    /// The engine reported a failure of its own.
    #[error("engine reported: {message}")]
    Backend {
        /// Engine-supplied description.
        message: String,
    },
}

impl EngineError {
    /// Builds a backend error from a message.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// True when the connection should be dropped and re-established.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Resolve { .. } | Self::Connect { .. } | Self::Io(_) | Self::Closed | Self::Protocol(_)
        )
    }
}
