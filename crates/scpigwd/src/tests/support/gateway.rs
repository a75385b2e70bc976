//! Gateway instances running against the simulated engine.

use std::sync::Arc;

use camino::Utf8PathBuf;
use scpi_config::{Config, EngineMode};
use scpi_engine::EngineClient;
use scpi_engine::memory::{InstrumentState, MemoryConnector, MemoryEngine, SharedInstrument};

use crate::AutoLoginRecord;
use crate::handlers::command_tree;
use crate::process::launch::Gateway;
use crate::session::{Dispatcher, Session};
use crate::transport::{TlsFixture, TransportKind};

use super::ScpiClient;

/// Gateway listening on ephemeral loopback ports.
pub(crate) struct GatewayHarness {
    gateway: Option<Gateway>,
    instrument: SharedInstrument,
    tls: TlsFixture,
}

impl GatewayHarness {
    pub(crate) fn start() -> Self {
        let tls = TlsFixture::generate();
        let instrument = SharedInstrument::default();
        let config = harness_config(&tls);
        let connector = Arc::new(MemoryConnector::new(instrument.clone()));
        let gateway = Gateway::start_with(&config, connector).expect("start gateway");
        Self {
            gateway: Some(gateway),
            instrument,
            tls,
        }
    }

    pub(crate) fn instrument(&self) -> &SharedInstrument {
        &self.instrument
    }

    pub(crate) fn update(&self, change: impl FnOnce(&mut InstrumentState)) {
        self.instrument.with(change).expect("instrument state");
    }

    pub(crate) fn autologin_path(&self) -> Utf8PathBuf {
        self.tls.dir().join("autologin.json")
    }

    pub(crate) fn store_autologin(&self, record: &AutoLoginRecord) {
        record
            .store(&self.autologin_path())
            .expect("store auto-login record");
    }

    fn gateway(&self) -> &Gateway {
        self.gateway.as_ref().expect("gateway running")
    }

    pub(crate) fn connect_plain(&self) -> ScpiClient {
        ScpiClient::plain(self.gateway().plain_addr().expect("plain address"))
    }

    pub(crate) fn connect_tls(&self) -> ScpiClient {
        ScpiClient::tls(self.gateway().tls_addr().expect("tls address"), &self.tls)
    }
}

impl Drop for GatewayHarness {
    fn drop(&mut self) {
        if let Some(gateway) = self.gateway.take() {
            let stopped = gateway.stop();
            if !std::thread::panicking() {
                stopped.expect("stop gateway");
            }
        }
    }
}

pub(crate) fn harness_config(tls: &TlsFixture) -> Config {
    Config {
        engine_mode: EngineMode::Simulated,
        bind_host: "127.0.0.1".to_owned(),
        plain_port: 0,
        fallback_port: 0,
        tls_port: 0,
        cert_path: tls.cert_path(),
        key_path: tls.key_path(),
        autologin_path: tls.dir().join("autologin.json"),
        ..Config::default()
    }
}

/// A session and dispatcher wired to `instrument` without any socket.
pub(crate) fn detached_session(instrument: &SharedInstrument) -> (Dispatcher, Session) {
    let tree = command_tree().expect("command tree");
    let engine = EngineClient::new(Box::new(MemoryEngine::new(instrument.clone())));
    let session = Session::new(1, TransportKind::Tcp, "localhost", engine);
    (Dispatcher::new(Arc::new(tree)), session)
}
