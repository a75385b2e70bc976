use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Selects how sessions reach the instrument engine.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EngineMode {
    /// JSONL RPC over TCP to the engine host given on the command line.
    #[default]
    Rpc,
    /// In-process simulated instrument shared by all sessions.
    Simulated,
}

/// Address of the remote instrument engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineEndpoint {
    /// Host name or IPv4 address of the engine.
    pub host: String,
    /// TCP port of the engine RPC service.
    pub port: u16,
}

impl EngineEndpoint {
    /// Builds an endpoint from host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl std::fmt::Display for EngineEndpoint {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.host, self.port)
    }
}
