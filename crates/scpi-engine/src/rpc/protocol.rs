//! Wire messages of the engine RPC.

use serde::{Deserialize, Serialize};

use crate::records::{OhCaptureSettings, OtnSetting, PhySetting, TxMapping};

/// Request line sent to the engine.
///
/// ```json
/// {"method":"apply_otn_setting","params":{"tx_clock":1}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum EngineRequest {
    /// Asks whether sessions must log in.
    RequiresLogin,
    /// Authenticates the session.
    Login {
        /// Raw user name bytes.
        username: Vec<u8>,
        /// Raw password bytes.
        password: Vec<u8>,
    },
    /// Ends the authenticated session.
    Logout,
    /// Reads the identification strings.
    Identity,
    /// Restores default configuration.
    Reset,
    /// Reads the transmitter configuration.
    OtnSettings,
    /// Writes one transmitter field.
    ApplyOtnSetting(OtnSetting),
    /// Reads receiver statistics.
    OtnStats,
    /// Reads statistics for one ODTU level.
    OdtuStats {
        /// Zero-based level.
        level: u8,
    },
    /// Reads the optical configuration.
    PhySettings,
    /// Writes one optical field.
    ApplyPhySetting(PhySetting),
    /// Reads optical readings.
    PhyStats,
    /// Injects one error.
    InsertSingleError {
        /// [`codes::error_type`](crate::codes::error_type) value.
        error_type: i32,
    },
    /// Changes the payload mapping.
    SetTxMapping(TxMapping),
    /// Sets the overhead capture trigger.
    SetOhCaptureSettings(OhCaptureSettings),
    /// Arms the disruption measurement.
    ArmSdtSwitch,
}

impl EngineRequest {
    /// Method name used in logs.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::RequiresLogin => "requires_login",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Identity => "identity",
            Self::Reset => "reset",
            Self::OtnSettings => "otn_settings",
            Self::ApplyOtnSetting(_) => "apply_otn_setting",
            Self::OtnStats => "otn_stats",
            Self::OdtuStats { .. } => "odtu_stats",
            Self::PhySettings => "phy_settings",
            Self::ApplyPhySetting(_) => "apply_phy_setting",
            Self::PhyStats => "phy_stats",
            Self::InsertSingleError { .. } => "insert_single_error",
            Self::SetTxMapping(_) => "set_tx_mapping",
            Self::SetOhCaptureSettings(_) => "set_oh_capture_settings",
            Self::ArmSdtSwitch => "arm_sdt_switch",
        }
    }
}

/// Reply line received from the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EngineReply {
    /// The call succeeded; `result` is method specific and `null` for actions.
    Ok {
        /// Method-specific payload.
        #[serde(default)]
        result: serde_json::Value,
    },
    /// The call failed.
    Error {
        /// Engine-supplied description.
        message: String,
        /// Set when the failure is a credential rejection.
        #[serde(default)]
        rejected: bool,
    },
}
