//! Settings and statistics records exchanged with the engine.
//!
//! Records are plain values: every read pulls a fresh copy from the engine and
//! nothing in the gateway caches them between commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codes;

/// Overhead bytes in the transmitted frame: 4 rows of 16 columns.
pub const OH_ROWS: usize = 4;
/// Columns per overhead row.
pub const OH_COLUMNS: usize = 16;
/// Multiplex structure identifier slots.
pub const MSI_SLOTS: usize = 32;
/// Tandem connection monitoring levels.
pub const TCM_LEVELS: usize = 6;
/// ODTU multiplexing levels reported by the engine (0 through 3).
pub const ODTU_LEVELS: u8 = 4;
/// Maximum SAPI length in the trail trace identifier.
pub const TTI_SAPI_LEN: usize = 15;
/// Maximum DAPI length in the trail trace identifier.
pub const TTI_DAPI_LEN: usize = 15;
/// Maximum operator-specific length in the trail trace identifier.
pub const TTI_OPERATOR_LEN: usize = 32;

/// Frequency offset applied to a transmitted signal, with an optional sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyOffset {
    /// Static offset in parts per million.
    pub offset_ppm: f64,
    /// Sweep start in parts per million.
    pub sweep_start_ppm: f64,
    /// Number of sweep steps; zero disables the sweep.
    pub sweep_steps: u32,
    /// Seconds between sweep steps.
    pub sweep_interval_s: f64,
}

/// Transmitter configuration of the OTN engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtnSettings {
    /// [`codes::interface`] value.
    pub tx_interface: i32,
    /// [`codes::clock`] value.
    pub tx_clock: i32,
    /// [`codes::mapping`] value.
    pub tx_mapping: i32,
    /// [`codes::pattern`] value.
    pub tx_pattern: i32,
    /// [`codes::error_type`] used for insertion.
    pub error_type: i32,
    /// [`codes::error_mode`] value.
    pub error_mode: i32,
    /// Insertion rate when the mode is rate based.
    pub error_rate: f64,
    /// [`codes::alarm`] generated when alarm generation is on.
    pub alarm_type: i32,
    /// Alarm generation switch.
    pub alarm_enabled: bool,
    /// Offset applied to the line signal.
    pub line_offset: FrequencyOffset,
    /// Offset applied to the client signal.
    pub client_offset: FrequencyOffset,
    /// Row-major overhead bytes, `OH_ROWS * OH_COLUMNS` long.
    pub oh_bytes: Vec<u8>,
    /// Transmitted MSI, `MSI_SLOTS` long.
    pub msi: Vec<u8>,
    /// Per-level TCM insertion switches.
    pub tcm_enabled: [bool; TCM_LEVELS],
    /// Source access point identifier.
    pub tti_sapi: String,
    /// Destination access point identifier.
    pub tti_dapi: String,
    /// Operator-specific trace text.
    pub tti_operator: String,
    /// Gap that counts as a service disruption.
    pub sdt_threshold_ms: f64,
}

impl Default for OtnSettings {
    fn default() -> Self {
        Self {
            tx_interface: codes::interface::OTU2,
            tx_clock: codes::clock::INTERNAL,
            tx_mapping: codes::mapping::PRBS,
            tx_pattern: codes::pattern::PRBS31,
            error_type: codes::error_type::OTU_BIP8,
            error_mode: codes::error_mode::OFF,
            error_rate: 1.0e-6,
            alarm_type: codes::alarm::LOS,
            alarm_enabled: false,
            line_offset: FrequencyOffset::default(),
            client_offset: FrequencyOffset::default(),
            oh_bytes: vec![0; OH_ROWS * OH_COLUMNS],
            msi: vec![0; MSI_SLOTS],
            tcm_enabled: [false; TCM_LEVELS],
            tti_sapi: String::new(),
            tti_dapi: String::new(),
            tti_operator: String::new(),
            sdt_threshold_ms: 50.0,
        }
    }
}

/// A single field written to [`OtnSettings`].
///
/// Vector-valued fields are always written whole: callers read the current
/// value, change their copy, and send it back in one change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtnSetting {
    /// Line interface.
    TxInterface(i32),
    /// Clock source.
    TxClock(i32),
    /// Payload pattern.
    TxPattern(i32),
    /// Error type used for insertion.
    ErrorType(i32),
    /// Error insertion mode.
    ErrorMode(i32),
    /// Error insertion rate.
    ErrorRate(f64),
    /// Generated alarm.
    AlarmType(i32),
    /// Alarm generation switch.
    AlarmEnabled(bool),
    /// Line frequency offset.
    LineOffset(FrequencyOffset),
    /// Client frequency offset.
    ClientOffset(FrequencyOffset),
    /// Whole overhead byte array.
    OhBytes(Vec<u8>),
    /// Whole MSI array.
    Msi(Vec<u8>),
    /// All TCM switches.
    TcmEnabled([bool; TCM_LEVELS]),
    /// Trace SAPI.
    TtiSapi(String),
    /// Trace DAPI.
    TtiDapi(String),
    /// Trace operator text.
    TtiOperator(String),
    /// Disruption threshold in milliseconds.
    SdtThreshold(f64),
}

impl OtnSettings {
    /// Applies one change to the record.
    pub fn apply(&mut self, change: OtnSetting) {
        match change {
            OtnSetting::TxInterface(value) => self.tx_interface = value,
            OtnSetting::TxClock(value) => self.tx_clock = value,
            OtnSetting::TxPattern(value) => self.tx_pattern = value,
            OtnSetting::ErrorType(value) => self.error_type = value,
            OtnSetting::ErrorMode(value) => self.error_mode = value,
            OtnSetting::ErrorRate(value) => self.error_rate = value,
            OtnSetting::AlarmType(value) => self.alarm_type = value,
            OtnSetting::AlarmEnabled(value) => self.alarm_enabled = value,
            OtnSetting::LineOffset(value) => self.line_offset = value,
            OtnSetting::ClientOffset(value) => self.client_offset = value,
            OtnSetting::OhBytes(value) => self.oh_bytes = value,
            OtnSetting::Msi(value) => self.msi = value,
            OtnSetting::TcmEnabled(value) => self.tcm_enabled = value,
            OtnSetting::TtiSapi(value) => self.tti_sapi = value,
            OtnSetting::TtiDapi(value) => self.tti_dapi = value,
            OtnSetting::TtiOperator(value) => self.tti_operator = value,
            OtnSetting::SdtThreshold(value) => self.sdt_threshold_ms = value,
        }
    }
}

/// Front-panel style alarm indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmLed {
    /// Alarm is currently active.
    pub is_red: bool,
    /// Alarm has been active at some point since the last reset.
    pub was_red: bool,
}

/// Alarm state together with its accumulated active time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmStatus {
    /// Indicator state.
    pub led: AlarmLed,
    /// Seconds the alarm has been active.
    pub seconds: u64,
}

/// Counter and rate for one error type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorCount {
    /// Errors counted since the last reset.
    pub count: u64,
    /// Errors per bit over the measurement.
    pub rate: f64,
}

/// Backward error indication results for one TCM level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TcmStats {
    /// BEI events counted.
    pub bei_count: u64,
    /// Average BEI per frame.
    pub bei_average: f64,
}

/// Receiver statistics of the OTN engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtnStats {
    /// Alarm status keyed by [`codes::alarm`] value.
    pub alarms: BTreeMap<i32, AlarmStatus>,
    /// Error counters keyed by [`codes::error_type`] value.
    pub errors: BTreeMap<i32, ErrorCount>,
    /// Codewords repaired by FEC.
    pub fec_corrected: u64,
    /// Codewords FEC could not repair.
    pub fec_uncorrected: u64,
    /// Per-level TCM results.
    pub tcm: [TcmStats; TCM_LEVELS],
    /// Seconds since the measurement started.
    pub elapsed_seconds: u64,
    /// Last measured service disruption.
    pub sdt_duration_ms: f64,
    /// Whether the disruption measurement is armed.
    pub sdt_armed: bool,
}

impl OtnStats {
    /// Status of one alarm type; types the engine never reported are clear.
    #[must_use]
    pub fn alarm(&self, code: i32) -> AlarmStatus {
        self.alarms.get(&code).copied().unwrap_or_default()
    }

    /// Counter for one error type; unreported types read as zero.
    #[must_use]
    pub fn error(&self, code: i32) -> ErrorCount {
        self.errors.get(&code).copied().unwrap_or_default()
    }
}

/// Statistics of one ODTU multiplexing level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdtuStats {
    /// Level these figures belong to.
    pub level: u8,
    /// Open connection indication.
    pub oci: AlarmLed,
    /// BIP errors counted at this level.
    pub bip_count: u64,
    /// MSI received at this level.
    pub received_msi: Vec<u8>,
}

/// Optical interface configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhySettings {
    /// Transmit laser switch.
    pub laser_on: bool,
}

/// A single field written to [`PhySettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhySetting {
    /// Transmit laser switch.
    Laser(bool),
}

impl PhySettings {
    /// Applies one change to the record.
    pub const fn apply(&mut self, change: PhySetting) {
        match change {
            PhySetting::Laser(value) => self.laser_on = value,
        }
    }
}

/// Optical interface readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhyStats {
    /// Whether a pluggable optics module is fitted.
    pub module_present: bool,
    /// Received optical power.
    pub rx_power_dbm: f64,
    /// Transmitted optical power.
    pub tx_power_dbm: f64,
    /// Module wavelength.
    pub wavelength_nm: f64,
    /// Vendor name read from the module.
    pub module_vendor: String,
}

/// Identification reported for `*IDN?`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineIdentity {
    /// Instrument maker.
    pub manufacturer: String,
    /// Model name.
    pub model: String,
    /// Serial number.
    pub serial: String,
    /// Firmware version.
    pub firmware: String,
}

/// Payload mapping request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxMapping {
    /// [`codes::mapping`] value.
    pub mapping: i32,
}

/// Overhead capture trigger position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OhCaptureSettings {
    /// Zero-based trigger row.
    pub row: u8,
    /// Zero-based trigger column.
    pub column: u8,
    /// Frames to capture.
    pub frames: u32,
}
