//! SCPI gateway daemon.
//!
//! The gateway accepts line-oriented SCPI sessions on a plain TCP port and a
//! TLS port, resolves each command against a static command tree, and
//! answers it through a per-session client of the instrument engine
//! ([`scpi_engine`]).
//!
//! Every connection runs on its own thread and moves through a fixed
//! lifecycle: the transport is opened (completing the TLS handshake where
//! needed), an optional persisted [`AutoLoginRecord`] is replayed as a
//! `LOGIN` command, commands are answered strictly one at a time, and the
//! session finally logs out of the engine and shuts its socket down.
//!
//! Failures a client can cause never end the session: they come back as
//! `+E<code>,"<text>"` lines built from [`ScpiError`]. A session ends when
//! the client sends `CLOSE` or the connection goes away.

mod autologin;
mod handlers;
mod process;
mod scpi;
mod session;
mod telemetry;
mod transport;

pub use autologin::{AutoLoginError, AutoLoginRecord};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_gateway,
};
pub use scpi::{LexError, ScpiError, TreeError};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};
pub use transport::{ListenerError, TlsError};

#[cfg(test)]
mod tests;
