//! Static handler table mapping command paths to handler functions.
//!
//! Every handler has the same shape: it receives the session and the residual
//! parameter text left over by command resolution, and returns
//!
//! - `Ok(Some(text))` for a response line (possibly empty),
//! - `Ok(None)` when nothing should be written, or
//! - `Err(kind)`, rendered as a `+E<code>` line by the session.
//!
//! Queries refresh the relevant engine record on every call; setters validate
//! their arguments before writing a single field back.

mod args;
mod format;
mod phy;
mod res;
mod system;
pub(crate) mod tables;
mod tx;

use std::fmt;

use crate::scpi::{CommandTree, ScpiError, TreeError};
use crate::session::Session;

/// Outcome of a handler call.
pub(crate) type HandlerResult = Result<Option<String>, ScpiError>;

/// Handler calling convention.
pub(crate) type HandlerFn = fn(&mut Session, &str) -> HandlerResult;

/// Who may run a command when the engine requires login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    /// Available before login.
    Public,
    /// Refused until the session has logged in.
    Authenticated,
}

/// One row of the handler table.
#[derive(Clone, Copy)]
pub(crate) struct HandlerEntry {
    pub(crate) path: &'static str,
    pub(crate) handler: HandlerFn,
    pub(crate) access: Access,
    /// Accepts path keywords past `path` as leading parameters, as in
    /// `TX:FREQOFFset:LINE 5.0`.
    pub(crate) keyword_parameters: bool,
}

impl HandlerEntry {
    const fn public(path: &'static str, handler: HandlerFn) -> Self {
        Self {
            path,
            handler,
            access: Access::Public,
            keyword_parameters: false,
        }
    }

    const fn authenticated(path: &'static str, handler: HandlerFn) -> Self {
        Self {
            path,
            handler,
            access: Access::Authenticated,
            keyword_parameters: false,
        }
    }

    const fn with_keyword_parameters(self) -> Self {
        Self {
            keyword_parameters: true,
            ..self
        }
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerEntry")
            .field("path", &self.path)
            .field("access", &self.access)
            .field("keyword_parameters", &self.keyword_parameters)
            .finish_non_exhaustive()
    }
}

/// Every registered command, queries ahead of setters within each module.
pub(crate) fn entries() -> impl Iterator<Item = &'static HandlerEntry> {
    system::ENTRIES
        .iter()
        .chain(tx::ENTRIES)
        .chain(res::ENTRIES)
        .chain(phy::ENTRIES)
}

/// Builds the command tree from the handler table.
///
/// # Errors
///
/// Returns [`TreeError`] when two entries claim the same path and kind or a
/// path template is malformed.
pub(crate) fn command_tree() -> Result<CommandTree<HandlerEntry>, TreeError> {
    let mut tree = CommandTree::default();
    for entry in entries() {
        tree.register(entry.path, *entry)?;
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn table_builds_into_a_tree() {
        let tree = command_tree().expect("handler table is consistent");
        assert_eq!(tree.len(), entries().count());
    }

    #[test]
    fn every_entry_resolves_to_its_own_handler() {
        let tree = command_tree().expect("tree");
        for entry in entries() {
            let resolved = tree
                .lookup(entry.path)
                .unwrap_or_else(|| panic!("{} does not resolve", entry.path));
            assert_eq!(resolved.handler.path, entry.path);
            assert!(
                std::ptr::fn_addr_eq(resolved.handler.handler, entry.handler),
                "{} resolves to a different handler",
                entry.path
            );
            assert!(
                resolved.residual.is_empty(),
                "{} leaves residual '{}'",
                entry.path,
                resolved.residual
            );
        }
    }

    #[test]
    fn paths_are_unique() {
        let mut seen = HashSet::new();
        for entry in entries() {
            assert!(seen.insert(entry.path), "duplicate entry {}", entry.path);
        }
    }

    #[test]
    fn only_session_control_is_public() {
        let public: Vec<&str> = entries()
            .filter(|entry| entry.access == Access::Public)
            .map(|entry| entry.path)
            .collect();
        assert_eq!(public, ["LOGIN", "LOGOUT", "CLOSE"]);
    }

    #[test]
    fn only_frequency_offsets_take_keyword_parameters() {
        let open: Vec<&str> = entries()
            .filter(|entry| entry.keyword_parameters)
            .map(|entry| entry.path)
            .collect();
        assert_eq!(open, ["TX:FREQOFFset"]);
    }
}
