//! Per-session façade over an [`InstrumentEngine`].

use tracing::debug;

use crate::ENGINE_TARGET;
use crate::engine::InstrumentEngine;
use crate::error::EngineError;
use crate::records::{
    EngineIdentity, OdtuStats, OhCaptureSettings, OtnSetting, OtnSettings, OtnStats, PhySetting,
    PhySettings, PhyStats, TxMapping,
};

/// Engine access as seen by SCPI handlers.
///
/// Every getter pulls a fresh record; handlers read the fields they need from
/// that value and drop it. Writes go through one [`OtnSetting`] or
/// [`PhySetting`] per call so unrelated fields are never resent.
pub struct EngineClient {
    engine: Box<dyn InstrumentEngine>,
}

impl std::fmt::Debug for EngineClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("EngineClient").finish_non_exhaustive()
    }
}

impl EngineClient {
    /// Wraps an engine handle.
    #[must_use]
    pub const fn new(engine: Box<dyn InstrumentEngine>) -> Self {
        Self { engine }
    }

    /// See [`InstrumentEngine::requires_login`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn requires_login(&mut self) -> Result<bool, EngineError> {
        self.engine.requires_login()
    }

    /// See [`InstrumentEngine::login`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn login(&mut self, username: &[u8], password: &[u8]) -> Result<(), EngineError> {
        debug!(
            target: ENGINE_TARGET,
            username = %String::from_utf8_lossy(username),
            "engine login"
        );
        self.engine.login(username, password)
    }

    /// See [`InstrumentEngine::logout`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn logout(&mut self) -> Result<(), EngineError> {
        debug!(target: ENGINE_TARGET, "engine logout");
        self.engine.logout()
    }

    /// See [`InstrumentEngine::identity`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn identity(&mut self) -> Result<EngineIdentity, EngineError> {
        self.engine.identity()
    }

    /// See [`InstrumentEngine::reset`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.engine.reset()
    }

    /// Fresh transmitter settings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn otn_sets(&mut self) -> Result<OtnSettings, EngineError> {
        self.engine.otn_settings()
    }

    /// Writes one transmitter field.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn set_otn(&mut self, change: OtnSetting) -> Result<(), EngineError> {
        debug!(target: ENGINE_TARGET, ?change, "applying otn setting");
        self.engine.apply_otn_setting(change)
    }

    /// Reads the current settings, derives one change from them, and writes it.
    ///
    /// Used for array-valued fields: the closure copies the array out of the
    /// snapshot, edits the copy, and returns it as the new whole value.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or an engine failure converted into `E`.
    pub fn modify_otn<E>(
        &mut self,
        derive: impl FnOnce(&OtnSettings) -> Result<OtnSetting, E>,
    ) -> Result<(), E>
    where
        E: From<EngineError>,
    {
        let current = self.otn_sets()?;
        let change = derive(&current)?;
        self.set_otn(change)?;
        Ok(())
    }

    /// Fresh receiver statistics.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn otn_stats(&mut self) -> Result<OtnStats, EngineError> {
        self.engine.otn_stats()
    }

    /// Fresh statistics for one ODTU level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn odtu_stats(&mut self, level: u8) -> Result<OdtuStats, EngineError> {
        self.engine.odtu_stats(level)
    }

    /// Fresh optical settings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn phy_sets(&mut self) -> Result<PhySettings, EngineError> {
        self.engine.phy_settings()
    }

    /// Writes one optical field.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn set_phy(&mut self, change: PhySetting) -> Result<(), EngineError> {
        debug!(target: ENGINE_TARGET, ?change, "applying phy setting");
        self.engine.apply_phy_setting(change)
    }

    /// Fresh optical readings.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn phy_stats(&mut self) -> Result<PhyStats, EngineError> {
        self.engine.phy_stats()
    }

    /// See [`InstrumentEngine::insert_single_error`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn insert_single_error(&mut self, error_type: i32) -> Result<(), EngineError> {
        self.engine.insert_single_error(error_type)
    }

    /// See [`InstrumentEngine::set_tx_mapping`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn set_tx_mapping(&mut self, mapping: TxMapping) -> Result<(), EngineError> {
        self.engine.set_tx_mapping(mapping)
    }

    /// See [`InstrumentEngine::set_oh_capture_settings`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn set_oh_capture_settings(
        &mut self,
        capture: OhCaptureSettings,
    ) -> Result<(), EngineError> {
        self.engine.set_oh_capture_settings(capture)
    }

    /// See [`InstrumentEngine::arm_sdt_switch`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine call fails.
    pub fn arm_sdt_switch(&mut self) -> Result<(), EngineError> {
        self.engine.arm_sdt_switch()
    }
}
