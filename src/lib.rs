//! Puppet Enterprise Status Check Library
//!
//! Queries the local Puppet Enterprise status API for one or more services
//! and maps their reported state onto Icinga/Nagios plugin exit codes.

pub mod config;
pub mod checker;
pub mod status;
pub mod transport;
pub mod errors;

pub use config::{Config, ServiceCheckRequest, TlsConfig};
pub use checker::{ServiceChecker, run};
pub use status::{ExitStatus, ServiceState, ServiceStatus};
pub use transport::{HttpStatusSource, StatusSource};
pub use errors::{CheckError, Result};
