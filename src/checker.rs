//! Sequential service checks and plugin exit code selection

use crate::config::{Cli, Config, ServiceCheckRequest};
use crate::errors::{CheckError, Result};
use crate::status::{ExitStatus, ServiceState, ServiceStatus};
use crate::transport::{HttpStatusSource, StatusSource};
use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::io::Write;
use tracing::{debug, error, info, warn};

/// Checks services one at a time, stopping at the first non-OK result
pub struct ServiceChecker<S> {
    source: S,
}

impl<S: StatusSource> ServiceChecker<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Check every request in order and return the plugin exit status.
    ///
    /// Services that cannot be reached are reported and skipped without
    /// affecting the result.
    pub async fn check_all<W: Write>(
        &self,
        requests: &[ServiceCheckRequest],
        out: &mut W,
    ) -> Result<ExitStatus> {
        for request in requests {
            let status = self.check_service(request, out).await?;

            if status != ExitStatus::Ok {
                info!(
                    "Stopping after {} with status {}",
                    request.service_name, status
                );
                return Ok(status);
            }
        }

        Ok(ExitStatus::Ok)
    }

    /// Check a single service, writing its plugin lines to `out`
    pub async fn check_service<W: Write>(
        &self,
        request: &ServiceCheckRequest,
        out: &mut W,
    ) -> Result<ExitStatus> {
        let name = &request.service_name;

        let body = match self.source.fetch(request).await {
            Ok(body) => body,
            Err(e) if e.is_transport() => {
                warn!("Skipping {} after transport failure: {}", request, e);
                writeln!(out, "Error retrieving data from API for {}: {}", name, e)?;
                return Ok(ExitStatus::Ok);
            }
            Err(CheckError::Json(e)) => {
                writeln!(out, "Invalid response from API for {}: {}", name, e)?;
                return Ok(ExitStatus::Unknown);
            }
            Err(e) => return Err(e),
        };

        let Some(status) = ServiceStatus::lookup(&body, name) else {
            writeln!(out, "Unknown service: {}", name)?;
            return Ok(ExitStatus::Unknown);
        };

        debug!("Service {} reported state {:?}", name, status.state);

        match status.state() {
            ServiceState::Running => {
                writeln!(out, "Service {} is running", name)?;
                Ok(ExitStatus::Ok)
            }
            ServiceState::Failed => {
                writeln!(out, "Service {} is in a failed state", name)?;
                write_diagnostics(out, &status)?;
                Ok(ExitStatus::Critical)
            }
            ServiceState::Other(_) => {
                writeln!(
                    out,
                    "Unknown service state for {}: {}",
                    name,
                    status.state_text()
                )?;
                write_diagnostics(out, &status)?;
                Ok(ExitStatus::Unknown)
            }
        }
    }
}

fn write_diagnostics<W: Write>(out: &mut W, status: &ServiceStatus) -> Result<()> {
    for line in status.diagnostic_lines() {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Parse `args`, run every configured check against the local API and
/// return the exit status. All plugin output goes to `out`.
pub async fn run<I, T, W>(args: I, out: &mut W) -> ExitStatus
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    match execute(args, out).await {
        Ok(status) => status,
        Err(e) => {
            error!("Status check aborted: {}", e);
            ExitStatus::Unknown
        }
    }
}

async fn execute<I, T, W>(args: I, out: &mut W) -> Result<ExitStatus>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            write!(out, "{}", e.render())?;
            return Ok(match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::Ok,
                _ => ExitStatus::Unknown,
            });
        }
    };

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            writeln!(out, "{}", e)?;
            return Ok(ExitStatus::Unknown);
        }
    };

    let source = match HttpStatusSource::new(&config) {
        Ok(source) => source,
        Err(CheckError::Tls(msg)) => {
            writeln!(out, "Error loading TLS material: {}", msg)?;
            return Ok(ExitStatus::Unknown);
        }
        Err(e) => {
            writeln!(out, "Error: {}", e)?;
            return Ok(ExitStatus::Unknown);
        }
    };

    debug!(
        "Checking {} service(s), mutual TLS {}",
        config.services.len(),
        if config.tls.is_some() { "enabled" } else { "disabled" }
    );

    ServiceChecker::new(source)
        .check_all(&config.services, out)
        .await
}
