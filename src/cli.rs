//! Command-line interface.
//!
//! Every `run` flag can also be given through its environment variable;
//! an explicit flag wins over the environment.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, RedirectorConfig, TimeoutConfig,
};
use crate::net::tls::{tls_settings, TlsError};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAPPING_PATH: &str = "./redirect-map.yml";

#[derive(Debug, Parser)]
#[command(name = "simple-redirector", version)]
#[command(about = "Redirect hosts and paths to their new home", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the redirector
    #[command(alias = "r")]
    Run(RunArgs),
    /// Load and validate a mapping file, then exit
    Validate(ValidateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Log level of the app (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Json)]
    pub log_format: LogFormatArg,

    /// Use the mapping file specified
    #[arg(short = 'f', long = "file", env = "MAPPING_PATH", default_value = DEFAULT_MAPPING_PATH)]
    pub mapping_path: PathBuf,

    /// Use the specified template file instead of the built-in page
    #[arg(short = 't', long = "template", env = "TEMPLATE_PATH")]
    pub template_path: Option<PathBuf>,

    /// Port to listen on
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind, defaults to all interfaces
    #[arg(long = "bind", env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// TLS certificate (PEM); requires --key
    #[arg(long = "cert", env = "TLS_CERT")]
    pub cert_path: Option<PathBuf>,

    /// TLS private key (PEM); requires --cert
    #[arg(long = "key", env = "TLS_KEY")]
    pub key_path: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long = "request-timeout", env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Mapping file to check
    #[arg(short = 'f', long = "file", env = "MAPPING_PATH", default_value = DEFAULT_MAPPING_PATH)]
    pub mapping_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Pretty => LogFormat::Pretty,
        }
    }
}

impl RunArgs {
    /// Runtime configuration described by these flags.
    pub fn into_config(self) -> Result<RedirectorConfig, TlsError> {
        let tls = tls_settings(self.cert_path, self.key_path)?;
        let bind_address = if self.bind_host.contains(':') && !self.bind_host.starts_with('[') {
            format!("[{}]:{}", self.bind_host, self.port)
        } else {
            format!("{}:{}", self.bind_host, self.port)
        };

        Ok(RedirectorConfig {
            listener: ListenerConfig { bind_address, tls },
            mapping_path: self.mapping_path,
            template_path: self.template_path,
            timeouts: TimeoutConfig {
                request_secs: self.request_timeout_secs,
            },
            observability: ObservabilityConfig {
                log_level: self.log_level,
                log_format: self.log_format.into(),
            },
        })
    }
}
