//! Session lifecycle states.

use strum::Display;

/// Lifecycle of a session, in the order a connection passes through it.
///
/// `AutoLoggedIn` is skipped when no usable auto-login record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum SessionState {
    Accepted,
    Opened,
    AutoLoggedIn,
    CommandLoop,
    Closing,
    Closed,
}
