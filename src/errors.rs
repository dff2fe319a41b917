//! Error types for the status check

use std::fmt;

pub type Result<T> = std::result::Result<T, CheckError>;

#[derive(Debug)]
pub enum CheckError {
    /// IO operation failed
    Io(std::io::Error),

    /// HTTP request failed
    Http(reqwest::Error),

    /// Response body was not valid JSON
    Json(serde_json::Error),

    /// Invalid command line input
    Usage(String),

    /// Configuration error
    Config(String),

    /// Certificate, key or CA material could not be loaded
    Tls(String),
}

impl CheckError {
    /// True for failures reaching the API (connect, TLS handshake, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(self, CheckError::Http(_))
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Io(err) => write!(f, "IO error: {}", err),
            CheckError::Http(err) => {
                // reqwest only names the URL; the reason lives in the causes
                write!(f, "{}", err)?;
                let mut cause = std::error::Error::source(err);
                while let Some(inner) = cause {
                    write!(f, ": {}", inner)?;
                    cause = inner.source();
                }
                Ok(())
            }
            CheckError::Json(err) => write!(f, "{}", err),
            CheckError::Usage(msg) => write!(f, "{}", msg),
            CheckError::Config(msg) => write!(f, "{}", msg),
            CheckError::Tls(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckError::Io(err) => Some(err),
            CheckError::Http(err) => Some(err),
            CheckError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CheckError {
    fn from(err: std::io::Error) -> Self {
        CheckError::Io(err)
    }
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        CheckError::Http(err)
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        CheckError::Json(err)
    }
}
