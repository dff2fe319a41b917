//! Command line handling and the immutable check configuration

use crate::errors::{CheckError, Result};
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Check the state of Puppet Enterprise services through the local status API.
#[derive(Debug, Parser)]
#[command(name = "check_pe_status", version)]
pub struct Cli {
    /// Name of the service and port to check (format: SERVICE_NAME:PORT_NUMBER)
    #[arg(short = 's', long = "service-port", value_name = "SERVICE_NAME:PORT_NUMBER")]
    pub service_ports: Vec<ServiceCheckRequest>,

    /// Client certificate (PEM) for mutual TLS
    #[arg(short = 'c', long, value_name = "PATH", env = "PE_STATUS_CERT")]
    pub certificate: Option<PathBuf>,

    /// Private key (PEM) matching the client certificate
    #[arg(short = 'k', long, value_name = "PATH", env = "PE_STATUS_KEY")]
    pub key: Option<PathBuf>,

    /// CA certificate (PEM) the API server certificate must chain to
    #[arg(short = 'a', long = "ca-cert", value_name = "PATH", env = "PE_STATUS_CA_CERT")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds (defaults to the HTTP client's own behaviour)
    #[arg(short = 't', long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

/// A single `name:port` pair to query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCheckRequest {
    pub service_name: String,
    pub port: u16,
}

impl ServiceCheckRequest {
    pub fn new(service_name: impl Into<String>, port: u16) -> Self {
        Self {
            service_name: service_name.into(),
            port,
        }
    }
}

impl FromStr for ServiceCheckRequest {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, port) = s
            .split_once(':')
            .ok_or_else(|| format!("expected SERVICE_NAME:PORT_NUMBER, got '{}'", s))?;

        if name.is_empty() {
            return Err(format!("missing service name in '{}'", s));
        }
        if name.trim() != name {
            return Err(format!("unexpected whitespace around service name in '{}'", s));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| format!("invalid port number in '{}'", s))?;
        if port == 0 {
            return Err(format!("port must be greater than 0 in '{}'", s));
        }

        Ok(Self::new(name, port))
    }
}

impl fmt::Display for ServiceCheckRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service_name, self.port)
    }
}

/// Mutual TLS material; only exists when all three paths were supplied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub certificate_path: PathBuf,
    pub key_path: PathBuf,
    pub ca_cert_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Services to check, in command line order
    pub services: Vec<ServiceCheckRequest>,

    /// Mutual TLS material, if configured
    pub tls: Option<TlsConfig>,

    /// Explicit request timeout
    pub timeout: Option<Duration>,
}

impl Config {
    /// Build the configuration from parsed command line flags
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let config = Self {
            services: cli.service_ports,
            tls: None,
            timeout: cli.timeout.map(Duration::from_secs),
        };
        config.validate()?;

        let tls = tls_from_flags(cli.certificate, cli.key, cli.ca_cert)?;

        Ok(Self { tls, ..config })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.services.is_empty() {
            return Err(CheckError::Usage(
                "Error: service and port are required".to_string(),
            ));
        }

        Ok(())
    }
}

/// The three TLS paths enable mutual TLS only together
fn tls_from_flags(
    certificate: Option<PathBuf>,
    key: Option<PathBuf>,
    ca_cert: Option<PathBuf>,
) -> Result<Option<TlsConfig>> {
    match (certificate, key, ca_cert) {
        (None, None, None) => Ok(None),
        (Some(certificate_path), Some(key_path), Some(ca_cert_path)) => Ok(Some(TlsConfig {
            certificate_path,
            key_path,
            ca_cert_path,
        })),
        (certificate, key, ca_cert) => {
            let missing: Vec<&str> = [
                ("--certificate", certificate.is_none()),
                ("--key", key.is_none()),
                ("--ca-cert", ca_cert.is_none()),
            ]
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(flag, _)| *flag)
            .collect();

            Err(CheckError::Usage(format!(
                "Error: --certificate, --key and --ca-cert must be given together (missing {})",
                missing.join(", ")
            )))
        }
    }
}
