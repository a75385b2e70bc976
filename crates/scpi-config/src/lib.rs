//! Configuration for the SCPI gateway daemon.
//!
//! Values are layered by `ortho_config`: the compiled defaults in
//! [`defaults`], then an optional TOML file named by `--config-path` or
//! `SCPIGW_CONFIG_PATH`, then `SCPIGW_*` environment variables, then
//! command-line flags. The single positional argument, the engine host, is
//! split off before the layered load and wins over every layer.

pub mod defaults;
mod engine;
mod logging;

use std::env;
use std::ffi::{OsStr, OsString};
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::*;
pub use engine::{EngineEndpoint, EngineMode};
pub use logging::{LogFormat, LogFormatParseError};

/// Long flags handed to the layered loader. Each one takes a value.
///
/// Keep in step with the fields of [`Config`].
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--engine-mode",
    "--engine-host",
    "--engine-port",
    "--bind-host",
    "--plain-port",
    "--fallback-port",
    "--tls-port",
    "--cert-path",
    "--key-path",
    "--autologin-path",
    "--log-filter",
    "--log-format",
];

/// Errors raised while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The positional arguments could not be parsed.
    #[error("invalid command line: {0}")]
    Arguments(#[from] clap::Error),
    /// A flag, file or environment layer held an invalid value.
    #[error("failed to load configuration: {source}")]
    Load {
        /// Loader failure, aggregated across layers.
        #[source]
        source: Arc<OrthoError>,
    },
}

#[derive(Debug, Parser)]
#[command(
    name = "scpigwd",
    about = "SCPI gateway for the instrument engine",
    disable_version_flag = true
)]
struct Positional {
    /// IPv4 address of the instrument engine.
    #[arg(value_name = "ENGINE_HOST")]
    engine_host: Option<String>,
}

/// Resolved gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SCPIGW")]
pub struct Config {
    /// How sessions reach the engine.
    #[ortho_config(default = EngineMode::Rpc)]
    pub engine_mode: EngineMode,
    /// Host of the engine RPC service.
    #[ortho_config(default = default_engine_host())]
    pub engine_host: String,
    /// Port of the engine RPC service.
    #[ortho_config(default = DEFAULT_ENGINE_PORT)]
    pub engine_port: u16,
    /// Host both SCPI listeners bind to.
    #[ortho_config(default = default_bind_host())]
    pub bind_host: String,
    /// Plain SCPI port.
    #[ortho_config(default = DEFAULT_PLAIN_PORT)]
    pub plain_port: u16,
    /// Plain SCPI port used when `plain_port` is taken.
    #[ortho_config(default = DEFAULT_FALLBACK_PORT)]
    pub fallback_port: u16,
    /// TLS SCPI port.
    #[ortho_config(default = DEFAULT_TLS_PORT)]
    pub tls_port: u16,
    /// PEM certificate chain for the TLS listener.
    #[ortho_config(default = default_cert_path())]
    pub cert_path: Utf8PathBuf,
    /// PEM private key for the TLS listener.
    #[ortho_config(default = default_key_path())]
    pub key_path: Utf8PathBuf,
    /// Auto-login record read at every session open.
    #[ortho_config(default = default_autologin_path())]
    pub autologin_path: Utf8PathBuf,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_mode: EngineMode::default(),
            engine_host: default_engine_host(),
            engine_port: DEFAULT_ENGINE_PORT,
            bind_host: default_bind_host(),
            plain_port: DEFAULT_PLAIN_PORT,
            fallback_port: DEFAULT_FALLBACK_PORT,
            tls_port: DEFAULT_TLS_PORT,
            cert_path: default_cert_path(),
            key_path: default_key_path(),
            autologin_path: default_autologin_path(),
            log_filter: default_log_filter_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an argument or any layer is invalid.
    pub fn from_process() -> Result<Self, ConfigError> {
        Self::from_args(env::args_os())
    }

    /// Loads configuration from explicit arguments and the process
    /// environment.
    ///
    /// The first argument is the program name, as with [`env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an argument or any layer is invalid.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let split = split_arguments(args.into_iter().map(Into::into).collect());
        let positional = Positional::try_parse_from(split.positional)?;
        let mut config =
            Self::load_from_iter(split.layered).map_err(|source| ConfigError::Load { source })?;
        if let Some(host) = positional.engine_host {
            config.engine_host = host;
        }
        Ok(config)
    }

    /// Engine RPC endpoint.
    #[must_use]
    pub fn engine(&self) -> EngineEndpoint {
        EngineEndpoint::new(self.engine_host.clone(), self.engine_port)
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// Arguments routed to the layered loader and to the positional parser.
/// Both lists start with the program name.
#[derive(Debug, PartialEq, Eq)]
struct SplitArguments {
    layered: Vec<OsString>,
    positional: Vec<OsString>,
}

fn split_arguments(args: Vec<OsString>) -> SplitArguments {
    let mut remaining = args.into_iter();
    let program = remaining
        .next()
        .unwrap_or_else(|| OsString::from(env!("CARGO_PKG_NAME")));
    let mut split = SplitArguments {
        layered: vec![program.clone()],
        positional: vec![program],
    };
    while let Some(argument) = remaining.next() {
        if !is_flag(&argument) {
            split.positional.push(argument);
            continue;
        }
        let takes_value = flag_takes_value(&argument);
        split.layered.push(argument);
        if takes_value {
            split.layered.extend(remaining.next());
        }
    }
    split
}

fn is_flag(argument: &OsStr) -> bool {
    argument.to_string_lossy().starts_with('-')
}

fn flag_takes_value(argument: &OsStr) -> bool {
    let text = argument.to_string_lossy();
    !text.contains('=') && CONFIG_CLI_FLAGS.contains(&text.as_ref())
}
