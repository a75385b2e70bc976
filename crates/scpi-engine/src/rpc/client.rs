//! Blocking JSONL client for the engine RPC.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::protocol::{EngineReply, EngineRequest};
use crate::ENGINE_TARGET;
use crate::engine::{EngineConnector, InstrumentEngine};
use crate::error::EngineError;
use crate::records::{
    EngineIdentity, OdtuStats, OhCaptureSettings, OtnSetting, OtnSettings, OtnStats, PhySetting,
    PhySettings, PhyStats, TxMapping,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Engine handle speaking JSONL over TCP.
#[derive(Debug)]
pub struct RpcEngine {
    host: String,
    port: u16,
    connection: Option<BufReader<TcpStream>>,
}

impl RpcEngine {
    /// Creates an unconnected handle; the socket opens on the first call.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connection: None,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn connection(&mut self) -> Result<&mut BufReader<TcpStream>, EngineError> {
        if self.connection.is_none() {
            let stream = self.open()?;
            self.connection = Some(BufReader::new(stream));
        }
        self.connection.as_mut().ok_or(EngineError::Closed)
    }

    fn open(&self) -> Result<TcpStream, EngineError> {
        let endpoint = self.endpoint();
        let address = resolve(&self.host, self.port).map_err(|source| EngineError::Resolve {
            endpoint: endpoint.clone(),
            source,
        })?;
        let stream = TcpStream::connect_timeout(&address, CONNECT_TIMEOUT).map_err(|source| {
            EngineError::Connect {
                endpoint: endpoint.clone(),
                source,
            }
        })?;
        stream.set_read_timeout(Some(CALL_TIMEOUT))?;
        stream.set_write_timeout(Some(CALL_TIMEOUT))?;
        stream.set_nodelay(true)?;
        debug!(target: ENGINE_TARGET, %endpoint, "connected to engine");
        Ok(stream)
    }

    fn call<T: DeserializeOwned>(&mut self, request: &EngineRequest) -> Result<T, EngineError> {
        let result = self.exchange(request);
        if let Err(error) = &result
            && error.is_transport()
        {
            warn!(
                target: ENGINE_TARGET,
                method = request.method(),
                %error,
                "dropping engine connection"
            );
            self.connection = None;
        }
        Ok(serde_json::from_value(result?)?)
    }

    fn exchange(&mut self, request: &EngineRequest) -> Result<serde_json::Value, EngineError> {
        let mut line = serde_json::to_vec(request)?;
        line.push(b'\n');

        let connection = self.connection()?;
        connection.get_mut().write_all(&line)?;
        connection.get_mut().flush()?;

        let mut reply = String::new();
        if connection.read_line(&mut reply)? == 0 {
            return Err(EngineError::Closed);
        }
        match serde_json::from_str::<EngineReply>(&reply)? {
            EngineReply::Ok { result } => Ok(result),
            EngineReply::Error { rejected: true, .. } => Err(EngineError::Rejected),
            EngineReply::Error { message, .. } => Err(EngineError::Backend { message }),
        }
    }
}

fn resolve(host: &str, port: u16) -> std::io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "no IPv4 address resolved",
            )
        })
}

impl InstrumentEngine for RpcEngine {
    fn requires_login(&mut self) -> Result<bool, EngineError> {
        self.call(&EngineRequest::RequiresLogin)
    }

    fn login(&mut self, username: &[u8], password: &[u8]) -> Result<(), EngineError> {
        self.call(&EngineRequest::Login {
            username: username.to_vec(),
            password: password.to_vec(),
        })
    }

    fn logout(&mut self) -> Result<(), EngineError> {
        self.call(&EngineRequest::Logout)
    }

    fn identity(&mut self) -> Result<EngineIdentity, EngineError> {
        self.call(&EngineRequest::Identity)
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        self.call(&EngineRequest::Reset)
    }

    fn otn_settings(&mut self) -> Result<OtnSettings, EngineError> {
        self.call(&EngineRequest::OtnSettings)
    }

    fn apply_otn_setting(&mut self, change: OtnSetting) -> Result<(), EngineError> {
        self.call(&EngineRequest::ApplyOtnSetting(change))
    }

    fn otn_stats(&mut self) -> Result<OtnStats, EngineError> {
        self.call(&EngineRequest::OtnStats)
    }

    fn odtu_stats(&mut self, level: u8) -> Result<OdtuStats, EngineError> {
        self.call(&EngineRequest::OdtuStats { level })
    }

    fn phy_settings(&mut self) -> Result<PhySettings, EngineError> {
        self.call(&EngineRequest::PhySettings)
    }

    fn apply_phy_setting(&mut self, change: PhySetting) -> Result<(), EngineError> {
        self.call(&EngineRequest::ApplyPhySetting(change))
    }

    fn phy_stats(&mut self) -> Result<PhyStats, EngineError> {
        self.call(&EngineRequest::PhyStats)
    }

    fn insert_single_error(&mut self, error_type: i32) -> Result<(), EngineError> {
        self.call(&EngineRequest::InsertSingleError { error_type })
    }

    fn set_tx_mapping(&mut self, mapping: TxMapping) -> Result<(), EngineError> {
        self.call(&EngineRequest::SetTxMapping(mapping))
    }

    fn set_oh_capture_settings(&mut self, capture: OhCaptureSettings) -> Result<(), EngineError> {
        self.call(&EngineRequest::SetOhCaptureSettings(capture))
    }

    fn arm_sdt_switch(&mut self) -> Result<(), EngineError> {
        self.call(&EngineRequest::ArmSdtSwitch)
    }
}

/// Connector opening one [`RpcEngine`] per session.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    host: String,
    port: u16,
}

impl RpcConnector {
    /// Builds a connector for the engine at `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl EngineConnector for RpcConnector {
    fn connect(&self) -> Box<dyn InstrumentEngine> {
        Box::new(RpcEngine::new(self.host.clone(), self.port))
    }
}
