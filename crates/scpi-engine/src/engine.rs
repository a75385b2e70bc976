//! Engine abstraction consumed by the gateway.

use crate::error::EngineError;
use crate::records::{
    EngineIdentity, OdtuStats, OhCaptureSettings, OtnSetting, OtnSettings, OtnStats, PhySetting,
    PhySettings, PhyStats, TxMapping,
};

/// Typed RPC surface of the instrument engine.
///
/// Each session owns one engine handle, so implementations only need to be
/// `Send`. Calls block until the engine answers.
pub trait InstrumentEngine: Send {
    /// Whether commands other than login require an authenticated session.
    fn requires_login(&mut self) -> Result<bool, EngineError>;

    /// Authenticates the session with the engine.
    fn login(&mut self, username: &[u8], password: &[u8]) -> Result<(), EngineError>;

    /// Ends the authenticated session.
    fn logout(&mut self) -> Result<(), EngineError>;

    /// Identification strings of the instrument.
    fn identity(&mut self) -> Result<EngineIdentity, EngineError>;

    /// Restores the instrument's default configuration.
    fn reset(&mut self) -> Result<(), EngineError>;

    /// Current transmitter configuration.
    fn otn_settings(&mut self) -> Result<OtnSettings, EngineError>;

    /// Writes one transmitter field.
    fn apply_otn_setting(&mut self, change: OtnSetting) -> Result<(), EngineError>;

    /// Current receiver statistics.
    fn otn_stats(&mut self) -> Result<OtnStats, EngineError>;

    /// Statistics for one ODTU level, `0..ODTU_LEVELS`.
    fn odtu_stats(&mut self, level: u8) -> Result<OdtuStats, EngineError>;

    /// Current optical configuration.
    fn phy_settings(&mut self) -> Result<PhySettings, EngineError>;

    /// Writes one optical field.
    fn apply_phy_setting(&mut self, change: PhySetting) -> Result<(), EngineError>;

    /// Current optical readings.
    fn phy_stats(&mut self) -> Result<PhyStats, EngineError>;

    /// Injects a single error of the given [`codes::error_type`](crate::codes::error_type).
    fn insert_single_error(&mut self, error_type: i32) -> Result<(), EngineError>;

    /// Changes the transmitted payload mapping.
    fn set_tx_mapping(&mut self, mapping: TxMapping) -> Result<(), EngineError>;

    /// Configures the overhead capture trigger.
    fn set_oh_capture_settings(&mut self, capture: OhCaptureSettings) -> Result<(), EngineError>;

    /// Arms the service disruption time measurement.
    fn arm_sdt_switch(&mut self) -> Result<(), EngineError>;
}

/// Creates a fresh engine handle for every new session.
pub trait EngineConnector: Send + Sync {
    /// Opens an engine handle. Connection failures surface on first use.
    fn connect(&self) -> Box<dyn InstrumentEngine>;
}
