//! JSONL RPC transport to a remote instrument engine.
//!
//! Each call writes one [`EngineRequest`] line and reads one [`EngineReply`]
//! line. Connections are opened lazily and dropped after any transport error
//! so the next call starts from a clean socket.

mod client;
mod protocol;

pub use client::{RpcConnector, RpcEngine};
pub use protocol::{EngineReply, EngineRequest};
