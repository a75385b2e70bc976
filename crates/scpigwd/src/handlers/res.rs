//! Receiver result queries.

use scpi_engine::codes::alarm;
use scpi_engine::records::{ODTU_LEVELS, OH_COLUMNS, OH_ROWS, OhCaptureSettings, OtnSetting};

use crate::scpi::ScpiError;
use crate::scpi::params::{NOT_NUMERIC, NumericForms, check_numeric, pre_parse_parameters};
use crate::session::Session;

use super::args::{float, index, integer, nth, token};
use super::format::{fixed, on_off, scientific};
use super::tables::{ALARMS, ERROR_TYPES};
use super::{HandlerEntry, HandlerResult};

const SDT_THRESHOLD_MAX_MS: f64 = 2000.0;
const MAX_CAPTURE_FRAMES: i64 = 1024;

pub(super) const ENTRIES: &[HandlerEntry] = &[
    HandlerEntry::authenticated("RES:ALarm:LOS?", alarm_state::<{ alarm::LOS }>),
    HandlerEntry::authenticated("RES:ALarm:LOF?", alarm_state::<{ alarm::LOF }>),
    HandlerEntry::authenticated("RES:ALarm:OOF?", alarm_state::<{ alarm::OOF }>),
    HandlerEntry::authenticated("RES:ALarm:LOM?", alarm_state::<{ alarm::LOM }>),
    HandlerEntry::authenticated("RES:ALarm:AIS?", alarm_state::<{ alarm::OTU_AIS }>),
    HandlerEntry::authenticated("RES:ALarm:BDI?", alarm_state::<{ alarm::OTU_BDI }>),
    HandlerEntry::authenticated("RES:ALarm:OCI?", alarm_state::<{ alarm::ODU_OCI }>),
    HandlerEntry::authenticated("RES:ALarm:LCK?", alarm_state::<{ alarm::ODU_LCK }>),
    HandlerEntry::authenticated("RES:ALarm:HISTory?", alarm_history),
    HandlerEntry::authenticated("RES:ERRor:COUNt?", error_count),
    HandlerEntry::authenticated("RES:ERRor:RATE?", error_rate),
    HandlerEntry::authenticated("RES:FEC:CORRected?", fec_corrected),
    HandlerEntry::authenticated("RES:FEC:UNCorrected?", fec_uncorrected),
    HandlerEntry::authenticated("RES:TCM1:BEI:AVErage?", bei_average::<0>),
    HandlerEntry::authenticated("RES:TCM1:BEI:COUNt?", bei_count::<0>),
    HandlerEntry::authenticated("RES:TCM2:BEI:AVErage?", bei_average::<1>),
    HandlerEntry::authenticated("RES:TCM2:BEI:COUNt?", bei_count::<1>),
    HandlerEntry::authenticated("RES:TCM3:BEI:AVErage?", bei_average::<2>),
    HandlerEntry::authenticated("RES:TCM3:BEI:COUNt?", bei_count::<2>),
    HandlerEntry::authenticated("RES:TCM4:BEI:AVErage?", bei_average::<3>),
    HandlerEntry::authenticated("RES:TCM4:BEI:COUNt?", bei_count::<3>),
    HandlerEntry::authenticated("RES:TCM5:BEI:AVErage?", bei_average::<4>),
    HandlerEntry::authenticated("RES:TCM5:BEI:COUNt?", bei_count::<4>),
    HandlerEntry::authenticated("RES:TCM6:BEI:AVErage?", bei_average::<5>),
    HandlerEntry::authenticated("RES:TCM6:BEI:COUNt?", bei_count::<5>),
    HandlerEntry::authenticated("RES:ODTU:OCI?", odtu_oci),
    HandlerEntry::authenticated("RES:ODTU:COUNt?", odtu_count),
    HandlerEntry::authenticated("RES:ELAPsed?", elapsed),
    HandlerEntry::authenticated("RES:SDT:DURation?", sdt_duration),
    HandlerEntry::authenticated("RES:SDT:THReshold?", sdt_threshold_query),
    HandlerEntry::authenticated("RES:SDT:THReshold", sdt_threshold_set),
    HandlerEntry::authenticated("RES:SDT:ARM", sdt_arm),
    HandlerEntry::authenticated("RES:OH:CAPture", oh_capture),
];

/// Current LED of one alarm: `ON` while the alarm is active.
fn alarm_state<const ALARM: i32>(session: &mut Session, _: &str) -> HandlerResult {
    let stats = session.engine().otn_stats()?;
    Ok(Some(on_off(stats.alarm(ALARM).led.is_red)))
}

/// `RES:ALarm:HISTory? <alarm>` reports whether the alarm fired since the
/// last reset, and for how many seconds.
fn alarm_history(session: &mut Session, parameters: &str) -> HandlerResult {
    let code = token(&pre_parse_parameters(parameters), 0, ALARMS)?;
    let status = session.engine().otn_stats()?.alarm(code);
    Ok(Some(format!(
        "{},{}",
        on_off(status.led.was_red),
        status.seconds
    )))
}

fn error_count(session: &mut Session, parameters: &str) -> HandlerResult {
    let code = token(&pre_parse_parameters(parameters), 0, ERROR_TYPES)?;
    let counter = session.engine().otn_stats()?.error(code);
    Ok(Some(counter.count.to_string()))
}

fn error_rate(session: &mut Session, parameters: &str) -> HandlerResult {
    let code = token(&pre_parse_parameters(parameters), 0, ERROR_TYPES)?;
    let counter = session.engine().otn_stats()?.error(code);
    scientific(counter.rate).map(Some)
}

fn fec_corrected(session: &mut Session, _: &str) -> HandlerResult {
    Ok(Some(session.engine().otn_stats()?.fec_corrected.to_string()))
}

fn fec_uncorrected(session: &mut Session, _: &str) -> HandlerResult {
    Ok(Some(session.engine().otn_stats()?.fec_uncorrected.to_string()))
}

fn bei_average<const LEVEL: usize>(session: &mut Session, _: &str) -> HandlerResult {
    let stats = session.engine().otn_stats()?;
    let tcm = stats.tcm.get(LEVEL).ok_or(ScpiError::InvalidResults)?;
    fixed(tcm.bei_average).map(Some)
}

fn bei_count<const LEVEL: usize>(session: &mut Session, _: &str) -> HandlerResult {
    let stats = session.engine().otn_stats()?;
    let tcm = stats.tcm.get(LEVEL).ok_or(ScpiError::InvalidResults)?;
    Ok(Some(tcm.bei_count.to_string()))
}

/// ODTU multiplexing level, `0` to `ODTU_LEVELS - 1`.
fn odtu_level(parameters: &str) -> Result<u8, ScpiError> {
    let values = pre_parse_parameters(parameters);
    let value = check_numeric(&nth(&values, 0)?.head, NumericForms::DECIMAL);
    if value == NOT_NUMERIC {
        return Err(ScpiError::DataType);
    }
    u8::try_from(value)
        .ok()
        .filter(|level| *level < ODTU_LEVELS)
        .ok_or(ScpiError::DataOutOfRange)
}

fn odtu_oci(session: &mut Session, parameters: &str) -> HandlerResult {
    let level = odtu_level(parameters)?;
    let stats = session.engine().odtu_stats(level)?;
    Ok(Some(on_off(stats.oci.is_red)))
}

fn odtu_count(session: &mut Session, parameters: &str) -> HandlerResult {
    let level = odtu_level(parameters)?;
    let stats = session.engine().odtu_stats(level)?;
    Ok(Some(stats.bip_count.to_string()))
}

fn elapsed(session: &mut Session, _: &str) -> HandlerResult {
    Ok(Some(session.engine().otn_stats()?.elapsed_seconds.to_string()))
}

fn sdt_duration(session: &mut Session, _: &str) -> HandlerResult {
    fixed(session.engine().otn_stats()?.sdt_duration_ms).map(Some)
}

fn sdt_threshold_query(session: &mut Session, _: &str) -> HandlerResult {
    fixed(session.engine().otn_sets()?.sdt_threshold_ms).map(Some)
}

fn sdt_threshold_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let threshold = float(&nth(&values, 0)?.head, 0.0..=SDT_THRESHOLD_MAX_MS)?;
    session
        .engine()
        .set_otn(OtnSetting::SdtThreshold(threshold))?;
    Ok(None)
}

fn sdt_arm(session: &mut Session, _: &str) -> HandlerResult {
    session.engine().arm_sdt_switch()?;
    Ok(None)
}

/// `RES:OH:CAPture <row> <column> [<frames>]` triggers an overhead capture
/// at a one-based byte position.
fn oh_capture(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let row = index(&nth(&values, 0)?.head, 1..=OH_ROWS)?;
    let column = index(&nth(&values, 1)?.head, 1..=OH_COLUMNS)?;
    let frames = values.get(2).map_or(Ok(1), |count| {
        integer(&count.head, NumericForms::DECIMAL, 1..=MAX_CAPTURE_FRAMES)
    })?;
    let capture = OhCaptureSettings {
        row: u8::try_from(row).map_err(|_| ScpiError::DataOutOfRange)?,
        column: u8::try_from(column).map_err(|_| ScpiError::DataOutOfRange)?,
        frames: u32::try_from(frames).map_err(|_| ScpiError::NumericData)?,
    };
    session.engine().set_oh_capture_settings(capture)?;
    Ok(None)
}
