//! Test suites for the SCPI gateway.

mod dispatch;
mod support;
