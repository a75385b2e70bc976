//! Connection handler running the session lifecycle.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use scpi_config::SESSION_READ_TIMEOUT;
use scpi_engine::{EngineClient, EngineConnector};
use tracing::{debug, info, warn};

use crate::autologin::AutoLoginRecord;
use crate::scpi::{CommandReader, LexError, ResponseWriter};
use crate::transport::{Connection, ConnectionHandler, ConnectionStream};

use super::{Dispatcher, SESSION_TARGET, Session, SessionState};

/// Runs one SCPI session per accepted connection.
pub(crate) struct SessionHandler {
    dispatcher: Dispatcher,
    connector: Arc<dyn EngineConnector>,
    autologin_path: Utf8PathBuf,
    engine_host: String,
}

impl SessionHandler {
    pub(crate) fn new(
        dispatcher: Dispatcher,
        connector: Arc<dyn EngineConnector>,
        autologin_path: Utf8PathBuf,
        engine_host: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            connector,
            autologin_path,
            engine_host: engine_host.into(),
        }
    }

    fn run(&self, session: &mut Session, stream: &mut ConnectionStream) {
        if let Err(error) = open(stream) {
            warn!(
                target: SESSION_TARGET,
                session = session.id(),
                %error,
                "session transport setup failed"
            );
            return;
        }
        session.enter(SessionState::Opened);
        info!(
            target: SESSION_TARGET,
            session = session.id(),
            transport = %session.transport(),
            engine = session.engine_host(),
            "session opened"
        );
        self.auto_login(session);
        session.enter(SessionState::CommandLoop);
        match self.command_loop(session, stream) {
            Ok(()) if session.close_requested() => {
                debug!(target: SESSION_TARGET, session = session.id(), "close requested");
            }
            Ok(()) => {
                debug!(target: SESSION_TARGET, session = session.id(), "peer closed connection");
            }
            Err(error) => {
                warn!(
                    target: SESSION_TARGET,
                    session = session.id(),
                    %error,
                    "session transport failed"
                );
            }
        }
    }

    fn auto_login(&self, session: &mut Session) {
        let Some(record) = AutoLoginRecord::load(&self.autologin_path) else {
            return;
        };
        if !record.enabled {
            debug!(target: SESSION_TARGET, session = session.id(), "auto-login disabled");
            return;
        }
        let Some(response) = self.dispatcher.dispatch(session, &record.login_command()) else {
            session.enter(SessionState::AutoLoggedIn);
            return;
        };
        warn!(
            target: SESSION_TARGET,
            session = session.id(),
            %response,
            "auto-login failed"
        );
    }

    /// Answers commands until the client closes the session or the peer goes
    /// away.
    fn command_loop(
        &self,
        session: &mut Session,
        stream: &mut ConnectionStream,
    ) -> Result<(), LexError> {
        let mut reader = CommandReader::default();
        while !session.close_requested() {
            let Some(line) = reader.next_command(stream)? else {
                return Ok(());
            };
            if let Some(response) = self.dispatcher.dispatch(session, &line) {
                ResponseWriter::new(&mut *stream).write_line(&response)?;
            }
        }
        Ok(())
    }
}

impl ConnectionHandler for SessionHandler {
    fn handle(&self, connection: Connection) {
        let Connection {
            id,
            peer,
            mut stream,
        } = connection;
        debug!(target: SESSION_TARGET, session = id, %peer, "session accepted");
        let engine = EngineClient::new(self.connector.connect());
        let mut session = Session::new(id, stream.kind(), self.engine_host.as_str(), engine);
        self.run(&mut session, &mut stream);
        close(&mut session, &mut stream);
    }
}

/// Arms the read timeout and completes the transport handshake.
///
/// The timeout is set first so a client that never finishes the TLS
/// handshake is dropped after one timeout.
fn open(stream: &mut ConnectionStream) -> io::Result<()> {
    stream.set_read_timeout(Some(SESSION_READ_TIMEOUT))?;
    stream.complete_handshake()
}

/// Logs out of the engine if needed and shuts the socket down.
fn close(session: &mut Session, stream: &mut ConnectionStream) {
    session.enter(SessionState::Closing);
    let logged_in = session
        .username()
        .map(|name| String::from_utf8_lossy(name).into_owned());
    if let Some(username) = logged_in {
        let outcome = session.engine().logout();
        outcome.map_or_else(
            |error| {
                warn!(
                    target: SESSION_TARGET,
                    session = session.id(),
                    %error,
                    "logout on close failed"
                );
            },
            |()| {
                debug!(
                    target: SESSION_TARGET,
                    session = session.id(),
                    %username,
                    "logged out on close"
                );
            },
        );
        session.clear_authentication();
    }
    if let Err(error) = stream.shutdown() {
        debug!(target: SESSION_TARGET, session = session.id(), %error, "socket shutdown failed");
    }
    session.enter(SessionState::Closed);
    info!(target: SESSION_TARGET, session = session.id(), "session closed");
}
