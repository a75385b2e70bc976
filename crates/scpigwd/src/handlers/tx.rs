//! Transmitter configuration commands.

use scpi_engine::records::{
    FrequencyOffset, MSI_SLOTS, OH_COLUMNS, OH_ROWS, OtnSetting, OtnSettings, TCM_LEVELS,
    TTI_DAPI_LEN, TTI_OPERATOR_LEN, TTI_SAPI_LEN, TxMapping,
};

use crate::scpi::ScpiError;
use crate::scpi::params::{
    NOT_NUMERIC, NumericForms, SubCommand, ascii_to_hex_sdh, join_free_text,
    pre_parse_parameters,
};
use crate::session::Session;

use super::args::{float, index, integer, nth, switch, token};
use super::format::{fixed, hex_bytes, on_off, scientific};
use super::tables::{
    ALARMS, CLOCKS, ERROR_MODES, ERROR_TYPES, INTERFACES, MAPPINGS, OFFSET_TARGETS, PATTERNS,
    TokenTable, token_for,
};
use super::{HandlerEntry, HandlerResult};

/// Frequency offsets and sweep starts are limited to ±100 ppm.
const OFFSET_RANGE_PPM: std::ops::RangeInclusive<f64> = -100.0..=100.0;
const MAX_SWEEP_STEPS: i64 = 1000;
const MAX_SWEEP_INTERVAL_S: f64 = 3600.0;
const ERROR_RATE_RANGE: std::ops::RangeInclusive<f64> = 1.0e-12..=1.0e-1;
/// ODU APS/PCC bytes: row 4, columns 5 to 8.
const APS_OFFSET: usize = 3 * OH_COLUMNS + 4;
const APS_LEN: usize = 4;

pub(super) const ENTRIES: &[HandlerEntry] = &[
    HandlerEntry::authenticated("TX:INTerface?", interface_query),
    HandlerEntry::authenticated("TX:INTerface", interface_set),
    HandlerEntry::authenticated("TX:CLOCK?", clock_query),
    HandlerEntry::authenticated("TX:CLOCK", clock_set),
    HandlerEntry::authenticated("TX:FREQOFFset:LINE?", line_offset_query),
    HandlerEntry::authenticated("TX:FREQOFFset:CLIent?", client_offset_query),
    HandlerEntry::authenticated("TX:FREQOFFset", offset_set).with_keyword_parameters(),
    HandlerEntry::authenticated("TX:ERRor:TYPE?", error_type_query),
    HandlerEntry::authenticated("TX:ERRor:TYPE", error_type_set),
    HandlerEntry::authenticated("TX:ERRor:RATE?", error_rate_query),
    HandlerEntry::authenticated("TX:ERRor:RATE", error_rate_set),
    HandlerEntry::authenticated("TX:ERRor:MODE?", error_mode_query),
    HandlerEntry::authenticated("TX:ERRor:MODE", error_mode_set),
    HandlerEntry::authenticated("TX:ERRor:INSert", error_insert),
    HandlerEntry::authenticated("TX:ALarm:TYPE?", alarm_type_query),
    HandlerEntry::authenticated("TX:ALarm:TYPE", alarm_type_set),
    HandlerEntry::authenticated("TX:ALarm:MODE?", alarm_mode_query),
    HandlerEntry::authenticated("TX:ALarm:MODE", alarm_mode_set),
    HandlerEntry::authenticated("TX:MAPping?", mapping_query),
    HandlerEntry::authenticated("TX:MAPping", mapping_set),
    HandlerEntry::authenticated("TX:PATTern?", pattern_query),
    HandlerEntry::authenticated("TX:PATTern", pattern_set),
    HandlerEntry::authenticated("TX:OH:BYTE?", oh_byte_query),
    HandlerEntry::authenticated("TX:OH:BYTE", oh_byte_set),
    HandlerEntry::authenticated("TX:OH:ODU:APS?", aps_query),
    HandlerEntry::authenticated("TX:OH:ODU:APS", aps_set),
    HandlerEntry::authenticated("TX:TCM:ENABle?", tcm_enable_query),
    HandlerEntry::authenticated("TX:TCM:ENABle", tcm_enable_set),
    HandlerEntry::authenticated("TX:MSI?", msi_query),
    HandlerEntry::authenticated("TX:MSI", msi_set),
    HandlerEntry::authenticated("TX:TTI:SAPI?", sapi_query),
    HandlerEntry::authenticated("TX:TTI:SAPI", sapi_set),
    HandlerEntry::authenticated("TX:TTI:DAPI?", dapi_query),
    HandlerEntry::authenticated("TX:TTI:DAPI", dapi_set),
    HandlerEntry::authenticated("TX:TTI:OPERator?", operator_query),
    HandlerEntry::authenticated("TX:TTI:OPERator", operator_set),
];

fn enum_query(
    session: &mut Session,
    table: TokenTable,
    read: fn(&OtnSettings) -> i32,
) -> HandlerResult {
    let settings = session.engine().otn_sets()?;
    Ok(Some(token_for(table, read(&settings))?.to_owned()))
}

fn enum_set(
    session: &mut Session,
    parameters: &str,
    table: TokenTable,
    write: fn(i32) -> OtnSetting,
) -> HandlerResult {
    let value = token(&pre_parse_parameters(parameters), 0, table)?;
    session.engine().set_otn(write(value))?;
    Ok(None)
}

fn interface_query(session: &mut Session, _: &str) -> HandlerResult {
    enum_query(session, INTERFACES, |settings| settings.tx_interface)
}

fn interface_set(session: &mut Session, parameters: &str) -> HandlerResult {
    enum_set(session, parameters, INTERFACES, OtnSetting::TxInterface)
}

fn clock_query(session: &mut Session, _: &str) -> HandlerResult {
    enum_query(session, CLOCKS, |settings| settings.tx_clock)
}

fn clock_set(session: &mut Session, parameters: &str) -> HandlerResult {
    enum_set(session, parameters, CLOCKS, OtnSetting::TxClock)
}

fn offset_text(offset: &FrequencyOffset) -> Result<String, ScpiError> {
    Ok(format!(
        "{},{},{},{}",
        fixed(offset.offset_ppm)?,
        fixed(offset.sweep_start_ppm)?,
        offset.sweep_steps,
        fixed(offset.sweep_interval_s)?
    ))
}

fn line_offset_query(session: &mut Session, _: &str) -> HandlerResult {
    let settings = session.engine().otn_sets()?;
    offset_text(&settings.line_offset).map(Some)
}

fn client_offset_query(session: &mut Session, _: &str) -> HandlerResult {
    let settings = session.engine().otn_sets()?;
    offset_text(&settings.client_offset).map(Some)
}

/// `TX:FREQOFFset <LINE|CLIent> <offset> [<start> <steps> <interval>]`.
///
/// Reached both directly and as the residual of `TX:FREQOFFset:LINE ...`.
fn offset_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let target = token(&values, 0, OFFSET_TARGETS)?;
    let offset_ppm = float(&nth(&values, 1)?.head, OFFSET_RANGE_PPM)?;
    let offset = if values.len() <= 2 {
        FrequencyOffset {
            offset_ppm,
            ..FrequencyOffset::default()
        }
    } else {
        let steps = integer(
            &nth(&values, 3)?.head,
            NumericForms::DECIMAL,
            0..=MAX_SWEEP_STEPS,
        )?;
        FrequencyOffset {
            offset_ppm,
            sweep_start_ppm: float(&nth(&values, 2)?.head, OFFSET_RANGE_PPM)?,
            sweep_steps: u32::try_from(steps).map_err(|_| ScpiError::NumericData)?,
            sweep_interval_s: float(&nth(&values, 4)?.head, 0.0..=MAX_SWEEP_INTERVAL_S)?,
        }
    };
    let change = if target == 0 {
        OtnSetting::LineOffset(offset)
    } else {
        OtnSetting::ClientOffset(offset)
    };
    session.engine().set_otn(change)?;
    Ok(None)
}

fn error_type_query(session: &mut Session, _: &str) -> HandlerResult {
    enum_query(session, ERROR_TYPES, |settings| settings.error_type)
}

fn error_type_set(session: &mut Session, parameters: &str) -> HandlerResult {
    enum_set(session, parameters, ERROR_TYPES, OtnSetting::ErrorType)
}

fn error_rate_query(session: &mut Session, _: &str) -> HandlerResult {
    let settings = session.engine().otn_sets()?;
    scientific(settings.error_rate).map(Some)
}

fn error_rate_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let rate = float(&nth(&values, 0)?.head, ERROR_RATE_RANGE)?;
    session.engine().set_otn(OtnSetting::ErrorRate(rate))?;
    Ok(None)
}

fn error_mode_query(session: &mut Session, _: &str) -> HandlerResult {
    enum_query(session, ERROR_MODES, |settings| settings.error_mode)
}

fn error_mode_set(session: &mut Session, parameters: &str) -> HandlerResult {
    enum_set(session, parameters, ERROR_MODES, OtnSetting::ErrorMode)
}

/// Injects one error of the given type, or of the configured type.
fn error_insert(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let error_type = if values.is_empty() {
        session.engine().otn_sets()?.error_type
    } else {
        token(&values, 0, ERROR_TYPES)?
    };
    session.engine().insert_single_error(error_type)?;
    Ok(None)
}

fn alarm_type_query(session: &mut Session, _: &str) -> HandlerResult {
    enum_query(session, ALARMS, |settings| settings.alarm_type)
}

fn alarm_type_set(session: &mut Session, parameters: &str) -> HandlerResult {
    enum_set(session, parameters, ALARMS, OtnSetting::AlarmType)
}

fn alarm_mode_query(session: &mut Session, _: &str) -> HandlerResult {
    let settings = session.engine().otn_sets()?;
    Ok(Some(on_off(settings.alarm_enabled)))
}

fn alarm_mode_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let enabled = switch(&pre_parse_parameters(parameters), 0)?;
    session.engine().set_otn(OtnSetting::AlarmEnabled(enabled))?;
    Ok(None)
}

fn mapping_query(session: &mut Session, _: &str) -> HandlerResult {
    enum_query(session, MAPPINGS, |settings| settings.tx_mapping)
}

fn mapping_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let mapping = token(&pre_parse_parameters(parameters), 0, MAPPINGS)?;
    session.engine().set_tx_mapping(TxMapping { mapping })?;
    Ok(None)
}

fn pattern_query(session: &mut Session, _: &str) -> HandlerResult {
    enum_query(session, PATTERNS, |settings| settings.tx_pattern)
}

fn pattern_set(session: &mut Session, parameters: &str) -> HandlerResult {
    enum_set(session, parameters, PATTERNS, OtnSetting::TxPattern)
}

/// Row-major offset of the overhead byte addressed by one-based row and
/// column parameters.
fn oh_offset(parameters: &[SubCommand]) -> Result<usize, ScpiError> {
    let row = index(&nth(parameters, 0)?.head, 1..=OH_ROWS)?;
    let column = index(&nth(parameters, 1)?.head, 1..=OH_COLUMNS)?;
    Ok(row * OH_COLUMNS + column)
}

fn hex_value(text: &str, max: i64) -> Result<i64, ScpiError> {
    let value = ascii_to_hex_sdh(text);
    if value == NOT_NUMERIC {
        return Err(ScpiError::DataType);
    }
    if value > max {
        return Err(ScpiError::NumericData);
    }
    Ok(value)
}

fn oh_byte_query(session: &mut Session, parameters: &str) -> HandlerResult {
    let offset = oh_offset(&pre_parse_parameters(parameters))?;
    let settings = session.engine().otn_sets()?;
    let byte = settings
        .oh_bytes
        .get(offset)
        .ok_or(ScpiError::InvalidResults)?;
    Ok(Some(hex_bytes(&[*byte])))
}

fn oh_byte_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let offset = oh_offset(&values)?;
    let byte = u8::try_from(hex_value(&nth(&values, 2)?.head, 0xFF)?)
        .map_err(|_| ScpiError::NumericData)?;
    session
        .engine()
        .modify_otn(|settings| -> Result<OtnSetting, ScpiError> {
            let mut bytes = settings.oh_bytes.clone();
            *bytes.get_mut(offset).ok_or(ScpiError::InvalidSettings)? = byte;
            Ok(OtnSetting::OhBytes(bytes))
        })?;
    Ok(None)
}

fn aps_query(session: &mut Session, _: &str) -> HandlerResult {
    let settings = session.engine().otn_sets()?;
    let bytes = settings
        .oh_bytes
        .get(APS_OFFSET..APS_OFFSET + APS_LEN)
        .ok_or(ScpiError::InvalidResults)?;
    Ok(Some(hex_bytes(bytes)))
}

fn aps_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let word = hex_value(&nth(&values, 0)?.head, i64::from(u32::MAX))?;
    let aps = network_order(word)?;
    session
        .engine()
        .modify_otn(|settings| -> Result<OtnSetting, ScpiError> {
            let mut bytes = settings.oh_bytes.clone();
            bytes
                .get_mut(APS_OFFSET..APS_OFFSET + APS_LEN)
                .ok_or(ScpiError::InvalidSettings)?
                .copy_from_slice(&aps);
            Ok(OtnSetting::OhBytes(bytes))
        })?;
    Ok(None)
}

fn tcm_enable_query(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let level = index(&nth(&values, 0)?.head, 1..=TCM_LEVELS)?;
    let settings = session.engine().otn_sets()?;
    let enabled = settings
        .tcm_enabled
        .get(level)
        .ok_or(ScpiError::InvalidResults)?;
    Ok(Some(on_off(*enabled)))
}

fn tcm_enable_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let level = index(&nth(&values, 0)?.head, 1..=TCM_LEVELS)?;
    let enabled = switch(&values, 1)?;
    session
        .engine()
        .modify_otn(|settings| -> Result<OtnSetting, ScpiError> {
            let mut levels = settings.tcm_enabled;
            *levels.get_mut(level).ok_or(ScpiError::InvalidSettings)? = enabled;
            Ok(OtnSetting::TcmEnabled(levels))
        })?;
    Ok(None)
}

/// `TX:MSI?` lists every slot; `TX:MSI? <slot>` reads one.
fn msi_query(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let settings = session.engine().otn_sets()?;
    let Some(requested) = values.first() else {
        let all = settings
            .msi
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",");
        return Ok(Some(all));
    };
    let slot = index(&requested.head, 1..=MSI_SLOTS)?;
    let value = settings.msi.get(slot).ok_or(ScpiError::InvalidResults)?;
    Ok(Some(value.to_string()))
}

/// `TX:MSI <slot>:<value> [<slot>:<value> ...]`, written in one change.
fn msi_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    nth(&values, 0)?;
    let mut updates = Vec::with_capacity(values.len());
    for pair in &values {
        let slot = index(&pair.head, 1..=MSI_SLOTS)?;
        let text = pair.tail.as_deref().ok_or(ScpiError::MissingParameter)?;
        let number = integer(text, NumericForms::BASED, 0..=i64::from(u8::MAX))?;
        updates.push((slot, u8::try_from(number).map_err(|_| ScpiError::NumericData)?));
    }
    session
        .engine()
        .modify_otn(|settings| -> Result<OtnSetting, ScpiError> {
            let mut msi = settings.msi.clone();
            for (slot, byte) in updates {
                *msi.get_mut(slot).ok_or(ScpiError::InvalidSettings)? = byte;
            }
            Ok(OtnSetting::Msi(msi))
        })?;
    Ok(None)
}

/// Most significant byte first, as the APS/PCC bytes travel on the line.
fn network_order(word: i64) -> Result<[u8; APS_LEN], ScpiError> {
    let mut bytes = [0; APS_LEN];
    for (position, byte) in bytes.iter_mut().rev().enumerate() {
        let shifted = word >> (8 * position);
        *byte = u8::try_from(shifted & 0xFF).map_err(|_| ScpiError::NumericData)?;
    }
    Ok(bytes)
}

/// Free text with optional surrounding quotes, truncated to `max_len`.
fn trail_trace_text(parameters: &str, max_len: usize) -> Result<String, ScpiError> {
    let trimmed = parameters.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed);
    let text = join_free_text(&pre_parse_parameters(unquoted), max_len);
    if text.is_empty() {
        return Err(ScpiError::MissingParameter);
    }
    if !text.chars().all(|character| character.is_ascii_graphic() || character == ' ') {
        return Err(ScpiError::IllegalParameterValue);
    }
    Ok(text)
}

fn sapi_query(session: &mut Session, _: &str) -> HandlerResult {
    Ok(Some(session.engine().otn_sets()?.tti_sapi))
}

fn sapi_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let text = trail_trace_text(parameters, TTI_SAPI_LEN)?;
    session.engine().set_otn(OtnSetting::TtiSapi(text))?;
    Ok(None)
}

fn dapi_query(session: &mut Session, _: &str) -> HandlerResult {
    Ok(Some(session.engine().otn_sets()?.tti_dapi))
}

fn dapi_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let text = trail_trace_text(parameters, TTI_DAPI_LEN)?;
    session.engine().set_otn(OtnSetting::TtiDapi(text))?;
    Ok(None)
}

fn operator_query(session: &mut Session, _: &str) -> HandlerResult {
    Ok(Some(session.engine().otn_sets()?.tti_operator))
}

fn operator_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let text = trail_trace_text(parameters, TTI_OPERATOR_LEN)?;
    session.engine().set_otn(OtnSetting::TtiOperator(text))?;
    Ok(None)
}
