//! Optical interface commands.

use scpi_engine::records::{PhySetting, PhyStats};

use crate::scpi::ScpiError;
use crate::scpi::params::pre_parse_parameters;
use crate::session::Session;

use super::args::switch;
use super::format::{fixed, on_off};
use super::{HandlerEntry, HandlerResult};

pub(super) const ENTRIES: &[HandlerEntry] = &[
    HandlerEntry::authenticated("PHY:LASer?", laser_query),
    HandlerEntry::authenticated("PHY:LASer", laser_set),
    HandlerEntry::authenticated("PHY:RX:POWer?", rx_power),
    HandlerEntry::authenticated("PHY:TX:POWer?", tx_power),
    HandlerEntry::authenticated("PHY:WAVelength?", wavelength),
    HandlerEntry::authenticated("PHY:MODule?", module),
];

/// Readings of the fitted optics module.
fn fitted_module(session: &mut Session) -> Result<PhyStats, ScpiError> {
    let stats = session.engine().phy_stats()?;
    if stats.module_present {
        Ok(stats)
    } else {
        Err(ScpiError::HardwareMissing)
    }
}

fn laser_query(session: &mut Session, _: &str) -> HandlerResult {
    Ok(Some(on_off(session.engine().phy_sets()?.laser_on)))
}

fn laser_set(session: &mut Session, parameters: &str) -> HandlerResult {
    let on = switch(&pre_parse_parameters(parameters), 0)?;
    if on {
        fitted_module(session)?;
    }
    session.engine().set_phy(PhySetting::Laser(on))?;
    Ok(None)
}

fn rx_power(session: &mut Session, _: &str) -> HandlerResult {
    fixed(fitted_module(session)?.rx_power_dbm).map(Some)
}

fn tx_power(session: &mut Session, _: &str) -> HandlerResult {
    fixed(fitted_module(session)?.tx_power_dbm).map(Some)
}

fn wavelength(session: &mut Session, _: &str) -> HandlerResult {
    fixed(fitted_module(session)?.wavelength_nm).map(Some)
}

fn module(session: &mut Session, _: &str) -> HandlerResult {
    Ok(Some(fitted_module(session)?.module_vendor))
}
