//! Response value formatting.

use crate::scpi::ScpiError;

/// `%.2e` with a signed, two-digit exponent: `1.00e-03`.
pub(super) fn scientific(value: f64) -> Result<String, ScpiError> {
    if !value.is_finite() {
        return Err(ScpiError::InvalidResults);
    }
    let rendered = format!("{value:.2e}");
    let (mantissa, exponent_text) = rendered
        .split_once('e')
        .ok_or(ScpiError::InvalidResults)?;
    let exponent: i32 = exponent_text
        .parse()
        .map_err(|_| ScpiError::InvalidResults)?;
    let sign = if exponent < 0 { '-' } else { '+' };
    Ok(format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs()))
}

/// `%0.3f`.
pub(super) fn fixed(value: f64) -> Result<String, ScpiError> {
    if value.is_finite() {
        Ok(format!("{value:.3}"))
    } else {
        Err(ScpiError::InvalidResults)
    }
}

pub(super) fn on_off(state: bool) -> String {
    if state { "ON" } else { "OFF" }.to_owned()
}

/// `#H`-prefixed upper-case hex, two digits per byte.
pub(super) fn hex_bytes(bytes: &[u8]) -> String {
    let digits: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
    format!("#H{digits}")
}
