//! Session control and identification commands.

use scpi_engine::EngineError;
use tracing::{info, warn};

use crate::scpi::ScpiError;
use crate::scpi::params::{join_free_text, pre_parse_parameters};
use crate::session::{SESSION_TARGET, Session};

use super::args::nth;
use super::{HandlerEntry, HandlerResult};

/// SCPI standard revision reported by `SYSTem:VERSion?`.
const SCPI_VERSION: &str = "1999.0";

/// Longest text accepted by `SYSTem:LOG`.
const LOG_TEXT_LIMIT: usize = 256;

pub(super) const ENTRIES: &[HandlerEntry] = &[
    HandlerEntry::public("LOGIN", login),
    HandlerEntry::public("LOGOUT", logout),
    HandlerEntry::public("CLOSE", close),
    HandlerEntry::authenticated("*IDN?", identify),
    HandlerEntry::authenticated("SYSTem:VERSion?", version),
    HandlerEntry::authenticated("SYSTem:SESSion?", session_info),
    HandlerEntry::authenticated("*RST", reset),
    HandlerEntry::authenticated("SYSTem:LOG", log_text),
];

fn identify(session: &mut Session, _: &str) -> HandlerResult {
    let identity = session.engine().identity()?;
    Ok(Some(format!(
        "{},{},{},{}",
        identity.manufacturer, identity.model, identity.serial, identity.firmware
    )))
}

fn version(_: &mut Session, _: &str) -> HandlerResult {
    Ok(Some(SCPI_VERSION.to_owned()))
}

fn session_info(session: &mut Session, _: &str) -> HandlerResult {
    let state = if session.is_authenticated() {
        "AUTHENTICATED"
    } else {
        "ANONYMOUS"
    };
    Ok(Some(format!(
        "{},{},{state}",
        session.id(),
        session.transport()
    )))
}

fn login(session: &mut Session, parameters: &str) -> HandlerResult {
    let values = pre_parse_parameters(parameters);
    let username = nth(&values, 0)?.original();
    let password = nth(&values, 1)?.original();
    match session
        .engine()
        .login(username.as_bytes(), password.as_bytes())
    {
        Ok(()) => {
            info!(
                target: SESSION_TARGET,
                session = session.id(),
                %username,
                "session logged in"
            );
            session.authenticate(username.into_bytes());
            Ok(None)
        }
        Err(EngineError::Rejected) => {
            warn!(
                target: SESSION_TARGET,
                session = session.id(),
                %username,
                "login rejected"
            );
            Err(ScpiError::IllegalParameterValue)
        }
        Err(error) => Err(error.into()),
    }
}

fn logout(session: &mut Session, _: &str) -> HandlerResult {
    if session.is_authenticated() {
        session.engine().logout()?;
        info!(target: SESSION_TARGET, session = session.id(), "session logged out");
    }
    session.clear_authentication();
    Ok(None)
}

fn close(session: &mut Session, _: &str) -> HandlerResult {
    session.request_close();
    Ok(None)
}

fn reset(session: &mut Session, _: &str) -> HandlerResult {
    session.engine().reset()?;
    Ok(None)
}

fn log_text(session: &mut Session, parameters: &str) -> HandlerResult {
    let text = join_free_text(&pre_parse_parameters(parameters), LOG_TEXT_LIMIT);
    if text.is_empty() {
        return Err(ScpiError::MissingParameter);
    }
    info!(target: SESSION_TARGET, session = session.id(), message = %text, "client log");
    Ok(None)
}
