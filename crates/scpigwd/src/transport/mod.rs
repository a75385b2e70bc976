//! Socket listeners for the plain and TLS SCPI ports.
//!
//! Each listener binds once at startup and accepts connections on a
//! background thread, handing every connection to a [`ConnectionHandler`] on
//! its own detached worker thread.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod listener_tests;
#[cfg(test)]
mod test_utils;
mod tls;

pub use self::errors::{ListenerError, TlsError};
pub(crate) use self::handler::{Connection, ConnectionHandler, ConnectionStream, TransportKind};
pub(crate) use self::listener::{ListenerHandle, SessionIds, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, TlsFixture};
pub(crate) use self::tls::load_server_config;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
