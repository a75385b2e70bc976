//! Shared harness for gateway tests.

mod client;
mod gateway;

pub(crate) use client::ScpiClient;
pub(crate) use gateway::{GatewayHarness, detached_session, harness_config};
