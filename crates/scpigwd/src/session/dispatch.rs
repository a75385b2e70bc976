//! Routes command lines to handlers.

use std::sync::Arc;

use tracing::debug;

use crate::handlers::{Access, HandlerEntry};
use crate::scpi::{CommandTree, DISPATCH_TARGET, ScpiError};

use super::Session;

/// Resolves command lines against the shared command tree and runs the
/// matching handler.
#[derive(Debug, Clone)]
pub(crate) struct Dispatcher {
    tree: Arc<CommandTree<HandlerEntry>>,
}

impl Dispatcher {
    pub(crate) const fn new(tree: Arc<CommandTree<HandlerEntry>>) -> Self {
        Self { tree }
    }

    /// Runs one normalised command line, returning the response line to
    /// write, if any.
    pub(crate) fn dispatch(&self, session: &mut Session, line: &str) -> Option<String> {
        let Some(resolved) = self.tree.lookup(line) else {
            debug!(
                target: DISPATCH_TARGET,
                session = session.id(),
                command = line.split_whitespace().next().unwrap_or_default(),
                "command not found"
            );
            return Some(session.error_response(ScpiError::CommandNotFound));
        };
        let entry = resolved.handler;
        if resolved.unconsumed > 0 && !entry.keyword_parameters {
            debug!(
                target: DISPATCH_TARGET,
                session = session.id(),
                path = entry.path,
                residual = %resolved.residual,
                "unexpected keyword after command"
            );
            return Some(session.error_response(ScpiError::CommandNotFound));
        }
        if let Err(error) = authorise(session, entry) {
            debug!(
                target: DISPATCH_TARGET,
                session = session.id(),
                path = entry.path,
                "command refused before login"
            );
            return Some(session.error_response(error));
        }
        debug!(
            target: DISPATCH_TARGET,
            session = session.id(),
            path = entry.path,
            kind = %resolved.kind,
            "dispatching command"
        );
        let outcome = (entry.handler)(session, &resolved.residual);
        outcome.unwrap_or_else(|error| {
            debug!(
                target: DISPATCH_TARGET,
                session = session.id(),
                path = entry.path,
                code = error.code(),
                "command failed"
            );
            Some(session.error_response(error))
        })
    }
}

fn authorise(session: &mut Session, entry: &HandlerEntry) -> Result<(), ScpiError> {
    if entry.access == Access::Public || session.is_authenticated() {
        return Ok(());
    }
    if session.login_required()? {
        Err(ScpiError::InvalidForCurrentConfig)
    } else {
        Ok(())
    }
}
