//! SCPI error taxonomy returned to clients.

use scpi_engine::EngineError;
use thiserror::Error;
use tracing::warn;

use super::DISPATCH_TARGET;

/// Closed set of errors a command can produce on the wire.
///
/// Each kind renders as a single `+E<code>,"<text>"` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScpiError {
    /// No handler matched the command path.
    #[error("Command not found")]
    CommandNotFound,
    /// A setter was invoked with too few arguments.
    #[error("Missing parameter")]
    MissingParameter,
    /// An argument does not match the allowed tokens.
    #[error("Illegal parameter value")]
    IllegalParameterValue,
    /// An argument has the wrong syntactic type.
    #[error("Data type error")]
    DataType,
    /// A numeric argument is outside the declared range.
    #[error("Numeric data error")]
    NumericData,
    /// An index or enumerated argument is outside its domain.
    #[error("Data out of range")]
    DataOutOfRange,
    /// The request conflicts with the current configuration.
    #[error("Invalid settings")]
    InvalidSettings,
    /// The engine returned a value the response cannot represent.
    #[error("Invalid results")]
    InvalidResults,
    /// The command is not allowed in the current session or engine state.
    #[error("Command invalid for current configuration")]
    InvalidForCurrentConfig,
    /// The queried physical resource is not fitted.
    #[error("Hardware missing")]
    HardwareMissing,
    /// The engine failed to answer a query.
    #[error("Generic query error")]
    GenericQuery,
}

impl ScpiError {
    /// Numeric SCPI code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::CommandNotFound => 1001,
            Self::MissingParameter => 1002,
            Self::IllegalParameterValue => 1003,
            Self::DataType => 1004,
            Self::NumericData => 1005,
            Self::DataOutOfRange => 1006,
            Self::InvalidSettings => 1007,
            Self::InvalidResults => 1008,
            Self::InvalidForCurrentConfig => 1009,
            Self::HardwareMissing => 1010,
            Self::GenericQuery => 1011,
        }
    }

    /// Response line without the terminator, e.g. `+E1003,"Illegal parameter value"`.
    #[must_use]
    pub fn response_line(self) -> String {
        format!("+E{:04},\"{self}\"", self.code())
    }
}

impl From<EngineError> for ScpiError {
    fn from(error: EngineError) -> Self {
        warn!(target: DISPATCH_TARGET, %error, "engine call failed");
        Self::GenericQuery
    }
}
