//! Gateway launch sequencing.

use std::net::SocketAddr;
use std::sync::Arc;

use scpi_config::{Config, EngineMode};
use scpi_engine::EngineConnector;
use scpi_engine::memory::MemoryConnector;
use scpi_engine::rpc::RpcConnector;
use tracing::info;

use crate::handlers::command_tree;
use crate::session::{Dispatcher, SessionHandler};
use crate::telemetry;
use crate::transport::{
    ConnectionHandler, ListenerHandle, SessionIds, SocketListener, load_server_config,
};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Loads configuration, serves both SCPI ports and blocks until a
/// termination signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, TLS material, or a listener
/// cannot be set up, or when signal handlers cannot be installed.
pub fn run_gateway() -> Result<(), LaunchError> {
    let config = Config::from_process()?;
    telemetry::initialise(&config)?;
    run_gateway_with(&config, &SystemShutdownSignal)
}

/// Runs the gateway with an injected shutdown signal.
pub(crate) fn run_gateway_with<S>(config: &Config, shutdown: &S) -> Result<(), LaunchError>
where
    S: ShutdownSignal,
{
    let gateway = Gateway::start(config)?;
    info!(
        target: PROCESS_TARGET,
        plain = ?gateway.plain_addr(),
        tls = ?gateway.tls_addr(),
        "gateway ready"
    );
    shutdown.wait()?;
    gateway.stop()?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}

/// Both running listeners.
pub(crate) struct Gateway {
    plain: ListenerHandle,
    plain_addr: Option<SocketAddr>,
    tls: ListenerHandle,
    tls_addr: Option<SocketAddr>,
}

impl Gateway {
    /// Starts the gateway against the engine selected by `config`.
    pub(crate) fn start(config: &Config) -> Result<Self, LaunchError> {
        Self::start_with(config, connector_for(config))
    }

    /// Builds the command tree, loads TLS material, and starts both
    /// listeners sharing one session id counter.
    pub(crate) fn start_with(
        config: &Config,
        connector: Arc<dyn EngineConnector>,
    ) -> Result<Self, LaunchError> {
        info!(
            target: PROCESS_TARGET,
            engine = %config.engine(),
            mode = %config.engine_mode,
            "starting gateway"
        );
        let tree = Arc::new(command_tree()?);
        let tls_config = load_server_config(&config.cert_path, &config.key_path)?;
        let plain_listener = SocketListener::bind_plain(
            &config.bind_host,
            config.plain_port,
            config.fallback_port,
        )?;
        let tls_listener =
            SocketListener::bind_tls(&config.bind_host, config.tls_port, tls_config)?;
        let plain_addr = plain_listener.local_addr();
        let tls_addr = tls_listener.local_addr();

        let handler: Arc<dyn ConnectionHandler> = Arc::new(SessionHandler::new(
            Dispatcher::new(tree),
            connector,
            config.autologin_path.clone(),
            config.engine_host.as_str(),
        ));
        let ids = Arc::new(SessionIds::new());
        let plain = plain_listener.start(Arc::clone(&handler), Arc::clone(&ids))?;
        let tls = tls_listener.start(handler, ids)?;
        Ok(Self {
            plain,
            plain_addr,
            tls,
            tls_addr,
        })
    }

    pub(crate) const fn plain_addr(&self) -> Option<SocketAddr> {
        self.plain_addr
    }

    pub(crate) const fn tls_addr(&self) -> Option<SocketAddr> {
        self.tls_addr
    }

    /// Stops accepting on both ports; open sessions keep running until
    /// their peers leave or the process exits.
    pub(crate) fn stop(self) -> Result<(), LaunchError> {
        self.plain.shutdown();
        self.tls.shutdown();
        let plain = self.plain.join();
        let tls = self.tls.join();
        plain?;
        tls?;
        Ok(())
    }
}

fn connector_for(config: &Config) -> Arc<dyn EngineConnector> {
    match config.engine_mode {
        EngineMode::Rpc => Arc::new(RpcConnector::new(
            config.engine_host.as_str(),
            config.engine_port,
        )),
        EngineMode::Simulated => Arc::new(MemoryConnector::default()),
    }
}
