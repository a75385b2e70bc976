//! SCPI line protocol: lexing, command resolution, parameters and errors.
//!
//! A session feeds raw socket bytes to the [`CommandReader`], resolves each
//! normalised line against the [`CommandTree`], and hands the residual
//! parameter text to the matched handler. Handlers report failures as
//! [`ScpiError`] values, which render as `+E<code>,"<text>"` lines.

mod errors;
mod keyword;
mod lexer;
pub(crate) mod params;
mod response;
mod tree;

pub use self::errors::ScpiError;
pub use self::lexer::LexError;
pub(crate) use self::lexer::CommandReader;
pub(crate) use self::response::ResponseWriter;
pub use self::tree::TreeError;
pub(crate) use self::tree::CommandTree;

/// Tracing target for command dispatch.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
