//! Per-connection SCPI sessions.
//!
//! A session owns its engine client, its authentication state, and the
//! lifecycle of one accepted connection. Sessions share nothing but the
//! read-only command tree and the engine connector.

mod dispatch;
mod handler;
mod state;

use scpi_engine::{EngineClient, EngineError};
use tracing::debug;

use crate::scpi::ScpiError;
use crate::transport::TransportKind;

pub(crate) use self::dispatch::Dispatcher;
pub(crate) use self::handler::SessionHandler;
pub(crate) use self::state::SessionState;

/// Tracing target for session lifecycle events.
pub(crate) const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

/// State of one client connection as seen by handlers.
#[derive(Debug)]
pub(crate) struct Session {
    id: u64,
    transport: TransportKind,
    engine_host: String,
    state: SessionState,
    username: Option<Vec<u8>>,
    engine: EngineClient,
    login_required: Option<bool>,
    close_requested: bool,
}

impl Session {
    pub(crate) fn new(
        id: u64,
        transport: TransportKind,
        engine_host: impl Into<String>,
        engine: EngineClient,
    ) -> Self {
        Self {
            id,
            transport,
            engine_host: engine_host.into(),
            state: SessionState::Accepted,
            username: None,
            engine,
            login_required: None,
            close_requested: false,
        }
    }

    pub(crate) const fn id(&self) -> u64 {
        self.id
    }

    pub(crate) const fn transport(&self) -> TransportKind {
        self.transport
    }

    pub(crate) fn engine_host(&self) -> &str {
        &self.engine_host
    }

    /// Moves to `next`, logging the transition.
    pub(crate) fn enter(&mut self, next: SessionState) {
        debug!(
            target: SESSION_TARGET,
            session = self.id,
            from = %self.state,
            to = %next,
            "session state changed"
        );
        self.state = next;
    }

    pub(crate) const fn engine(&mut self) -> &mut EngineClient {
        &mut self.engine
    }

    pub(crate) const fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    pub(crate) fn username(&self) -> Option<&[u8]> {
        self.username.as_deref()
    }

    pub(crate) fn authenticate(&mut self, username: Vec<u8>) {
        self.username = Some(username);
    }

    pub(crate) fn clear_authentication(&mut self) {
        self.username = None;
    }

    /// Asks the command loop to close the session once the current command
    /// has been answered.
    pub(crate) const fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub(crate) const fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Wire form of `kind`.
    pub(crate) fn error_response(&self, kind: ScpiError) -> String {
        kind.response_line()
    }

    /// Whether the engine refuses anonymous sessions, asked once per session.
    pub(crate) fn login_required(&mut self) -> Result<bool, EngineError> {
        if let Some(required) = self.login_required {
            return Ok(required);
        }
        let required = self.engine.requires_login()?;
        self.login_required = Some(required);
        Ok(required)
    }
}
