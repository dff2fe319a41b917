//! HTTP transport for querying the Puppet Enterprise status API

use crate::config::{Config, ServiceCheckRequest, TlsConfig};
use crate::errors::{CheckError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Certificate, Client, ClientBuilder, Identity, Url};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// The status API is only ever queried on the local host
pub const DEFAULT_ORIGIN: &str = "https://localhost";

const STATUS_PATH: &str = "/status/v1/services";

/// Anything that can answer a status query for one service
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch and parse the status document for `request`
    async fn fetch(&self, request: &ServiceCheckRequest) -> Result<Value>;
}

/// Status source backed by the live HTTP API
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: Client,
    origin: String,
}

impl HttpStatusSource {
    /// Create a source for the local API using the configured TLS material
    pub fn new(config: &Config) -> Result<Self> {
        let client = build_client(config.tls.as_ref(), config.timeout)?;

        Ok(Self {
            client,
            origin: DEFAULT_ORIGIN.to_string(),
        })
    }

    /// Point requests at a different scheme and host; the port still comes
    /// from each request
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// `<origin>:<port>/status/v1/services?service=<name>`
    pub fn status_url(&self, request: &ServiceCheckRequest) -> Result<Url> {
        let base = format!("{}:{}{}", self.origin, request.port, STATUS_PATH);

        Url::parse_with_params(&base, &[("service", request.service_name.as_str())])
            .map_err(|e| CheckError::Config(format!("invalid status URL {}: {}", base, e)))
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch(&self, request: &ServiceCheckRequest) -> Result<Value> {
        let url = self.status_url(request)?;
        debug!("Requesting status of {} from {}", request.service_name, url);

        let response = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(CheckError::Http)?;

        // Unhealthy services are reported with 503 and a normal body
        let status = response.status();
        debug!("Status API answered {} for {}", status, request.service_name);

        let body = response.text().await.map_err(CheckError::Http)?;
        let parsed = serde_json::from_str(&body)?;

        Ok(parsed)
    }
}

/// Build the HTTP client once, from an explicit TLS configuration.
///
/// With TLS material the supplied CA is the only trust root and the client
/// presents its own certificate. Without it the server certificate is not
/// verified at all.
pub fn build_client(tls: Option<&TlsConfig>, timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder()
        .use_rustls_tls()
        .user_agent(format!("pe_status_check/{}", env!("CARGO_PKG_VERSION")));

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder = match tls {
        Some(tls) => apply_mutual_tls(builder, tls)?,
        None => builder.danger_accept_invalid_certs(true),
    };

    builder
        .build()
        .map_err(|e| CheckError::Tls(format!("unable to initialise TLS client: {}", e)))
}

fn apply_mutual_tls(builder: ClientBuilder, tls: &TlsConfig) -> Result<ClientBuilder> {
    let mut identity_pem = read_pem(&tls.certificate_path, "certificate")?;
    identity_pem.push(b'\n');
    identity_pem.extend(read_pem(&tls.key_path, "private key")?);

    let identity = Identity::from_pem(&identity_pem).map_err(|e| {
        CheckError::Tls(format!(
            "invalid client certificate {} or key {}: {}",
            tls.certificate_path.display(),
            tls.key_path.display(),
            e
        ))
    })?;

    let ca_pem = read_pem(&tls.ca_cert_path, "CA certificate")?;
    let ca = Certificate::from_pem(&ca_pem).map_err(|e| {
        CheckError::Tls(format!(
            "invalid CA certificate {}: {}",
            tls.ca_cert_path.display(),
            e
        ))
    })?;

    debug!(
        "Using client certificate {} with CA {}",
        tls.certificate_path.display(),
        tls.ca_cert_path.display()
    );

    Ok(builder
        .identity(identity)
        .tls_built_in_root_certs(false)
        .add_root_certificate(ca))
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| CheckError::Tls(format!("unable to read {} {}: {}", what, path.display(), e)))
}
