//! Instrument engine façade for the SCPI gateway.
//!
//! The gateway never interprets instrument semantics itself: it reads typed
//! records from an [`InstrumentEngine`], formats them for SCPI clients, and
//! writes single-field changes back. This crate defines that contract, the
//! per-session [`EngineClient`], a JSONL RPC transport ([`rpc`]) for a remote
//! engine, and an in-process simulator ([`memory`]).

mod client;
#[expect(missing_docs, reason = "values mirror the engine schema one to one")]
pub mod codes;
mod engine;
mod error;
pub mod memory;
pub mod records;
pub mod rpc;

pub use client::EngineClient;
pub use engine::{EngineConnector, InstrumentEngine};
pub use error::EngineError;

/// Tracing target for engine calls.
pub const ENGINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::engine");
