//! In-process simulated instrument.
//!
//! All sessions created from one [`MemoryConnector`] observe the same
//! [`InstrumentState`], which makes the simulator a faithful stand-in for the
//! real engine in tests and standalone runs.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::ENGINE_TARGET;
use crate::engine::{EngineConnector, InstrumentEngine};
use crate::error::EngineError;
use crate::records::{
    EngineIdentity, ODTU_LEVELS, OdtuStats, OhCaptureSettings, OtnSetting, OtnSettings, OtnStats,
    PhySetting, PhySettings, PhyStats, TxMapping,
};

/// Complete simulated instrument state.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentState {
    /// Answer to identification requests.
    pub identity: EngineIdentity,
    /// Transmitter configuration.
    pub otn_settings: OtnSettings,
    /// Receiver statistics.
    pub otn_stats: OtnStats,
    /// One entry per ODTU level.
    pub odtu: Vec<OdtuStats>,
    /// Optical configuration.
    pub phy_settings: PhySettings,
    /// Optical readings.
    pub phy_stats: PhyStats,
    /// Credentials the engine accepts; `None` disables authentication.
    pub credentials: Option<(Vec<u8>, Vec<u8>)>,
    /// Sessions currently logged in.
    pub active_logins: usize,
    /// Error types injected through single-error insertion, oldest first.
    pub inserted_errors: Vec<i32>,
    /// Last requested overhead capture trigger.
    pub oh_capture: Option<OhCaptureSettings>,
}

impl Default for InstrumentState {
    fn default() -> Self {
        Self {
            identity: EngineIdentity {
                manufacturer: "SIMULATED".to_owned(),
                model: "OTN-ENGINE".to_owned(),
                serial: "0000000".to_owned(),
                firmware: env!("CARGO_PKG_VERSION").to_owned(),
            },
            otn_settings: OtnSettings::default(),
            otn_stats: OtnStats::default(),
            odtu: (0..ODTU_LEVELS)
                .map(|level| OdtuStats {
                    level,
                    ..OdtuStats::default()
                })
                .collect(),
            phy_settings: PhySettings::default(),
            phy_stats: PhyStats {
                module_present: true,
                rx_power_dbm: -3.5,
                tx_power_dbm: 0.8,
                wavelength_nm: 1310.0,
                module_vendor: "SIMULATED SFP+".to_owned(),
            },
            credentials: None,
            active_logins: 0,
            inserted_errors: Vec::new(),
            oh_capture: None,
        }
    }
}

/// Shared handle on the simulated instrument.
#[derive(Debug, Clone, Default)]
pub struct SharedInstrument {
    state: Arc<Mutex<InstrumentState>>,
}

impl SharedInstrument {
    /// Wraps an initial state.
    #[must_use]
    pub fn new(state: InstrumentState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Runs `f` with exclusive access to the state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Backend`] when a previous holder panicked.
    pub fn with<T>(&self, f: impl FnOnce(&mut InstrumentState) -> T) -> Result<T, EngineError> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    fn lock(&self) -> Result<MutexGuard<'_, InstrumentState>, EngineError> {
        self.state
            .lock()
            .map_err(|_| EngineError::backend("instrument state lock poisoned"))
    }
}

/// Session handle on a [`SharedInstrument`].
#[derive(Debug)]
pub struct MemoryEngine {
    instrument: SharedInstrument,
    logged_in: bool,
}

impl MemoryEngine {
    /// Opens a handle on the shared instrument.
    #[must_use]
    pub const fn new(instrument: SharedInstrument) -> Self {
        Self {
            instrument,
            logged_in: false,
        }
    }
}

impl InstrumentEngine for MemoryEngine {
    fn requires_login(&mut self) -> Result<bool, EngineError> {
        self.instrument.with(|state| state.credentials.is_some())
    }

    fn login(&mut self, username: &[u8], password: &[u8]) -> Result<(), EngineError> {
        let already = self.logged_in;
        let accepted = self.instrument.with(|state| {
            let accepted = state.credentials.as_ref().is_none_or(|(user, pass)| {
                user.as_slice() == username && pass.as_slice() == password
            });
            if accepted && !already {
                state.active_logins += 1;
            }
            accepted
        })?;
        if !accepted {
            return Err(EngineError::Rejected);
        }
        self.logged_in = true;
        Ok(())
    }

    fn logout(&mut self) -> Result<(), EngineError> {
        if !self.logged_in {
            return Ok(());
        }
        self.instrument
            .with(|state| state.active_logins = state.active_logins.saturating_sub(1))?;
        self.logged_in = false;
        Ok(())
    }

    fn identity(&mut self) -> Result<EngineIdentity, EngineError> {
        self.instrument.with(|state| state.identity.clone())
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        self.instrument.with(|state| {
            state.otn_settings = OtnSettings::default();
            state.phy_settings = PhySettings::default();
            state.otn_stats = OtnStats::default();
            state.inserted_errors.clear();
            state.oh_capture = None;
        })
    }

    fn otn_settings(&mut self) -> Result<OtnSettings, EngineError> {
        self.instrument.with(|state| state.otn_settings.clone())
    }

    fn apply_otn_setting(&mut self, change: OtnSetting) -> Result<(), EngineError> {
        self.instrument.with(|state| state.otn_settings.apply(change))
    }

    fn otn_stats(&mut self) -> Result<OtnStats, EngineError> {
        self.instrument.with(|state| state.otn_stats.clone())
    }

    fn odtu_stats(&mut self, level: u8) -> Result<OdtuStats, EngineError> {
        self.instrument
            .with(|state| state.odtu.get(usize::from(level)).cloned())?
            .ok_or_else(|| EngineError::backend(format!("no ODTU level {level}")))
    }

    fn phy_settings(&mut self) -> Result<PhySettings, EngineError> {
        self.instrument.with(|state| state.phy_settings)
    }

    fn apply_phy_setting(&mut self, change: PhySetting) -> Result<(), EngineError> {
        self.instrument.with(|state| state.phy_settings.apply(change))
    }

    fn phy_stats(&mut self) -> Result<PhyStats, EngineError> {
        self.instrument.with(|state| state.phy_stats.clone())
    }

    fn insert_single_error(&mut self, error_type: i32) -> Result<(), EngineError> {
        self.instrument.with(|state| {
            state.inserted_errors.push(error_type);
            state
                .otn_stats
                .errors
                .entry(error_type)
                .or_default()
                .count += 1;
        })
    }

    fn set_tx_mapping(&mut self, mapping: TxMapping) -> Result<(), EngineError> {
        self.instrument
            .with(|state| state.otn_settings.tx_mapping = mapping.mapping)
    }

    fn set_oh_capture_settings(&mut self, capture: OhCaptureSettings) -> Result<(), EngineError> {
        self.instrument.with(|state| state.oh_capture = Some(capture))
    }

    fn arm_sdt_switch(&mut self) -> Result<(), EngineError> {
        self.instrument.with(|state| {
            state.otn_stats.sdt_armed = true;
            state.otn_stats.sdt_duration_ms = 0.0;
        })
    }
}

impl Drop for MemoryEngine {
    fn drop(&mut self) {
        if let Err(error) = self.logout() {
            debug!(target: ENGINE_TARGET, %error, "simulated logout on drop failed");
        }
    }
}

/// Connector handing out [`MemoryEngine`] handles on one instrument.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    instrument: SharedInstrument,
}

impl MemoryConnector {
    /// Builds a connector over the given instrument.
    #[must_use]
    pub const fn new(instrument: SharedInstrument) -> Self {
        Self { instrument }
    }

    /// The instrument shared by every handle.
    #[must_use]
    pub const fn instrument(&self) -> &SharedInstrument {
        &self.instrument
    }
}

impl EngineConnector for MemoryConnector {
    fn connect(&self) -> Box<dyn InstrumentEngine> {
        Box::new(MemoryEngine::new(self.instrument.clone()))
    }
}
