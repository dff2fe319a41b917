//! Status API response model and monitoring plugin states

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Plugin exit codes understood by Icinga and Nagios
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Ok = 0,
    /// Reserved; no check currently reports it
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Ok => write!(f, "OK"),
            ExitStatus::Warning => write!(f, "WARNING"),
            ExitStatus::Critical => write!(f, "CRITICAL"),
            ExitStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceState {
    Running,
    Failed,
    Other(String),
}

impl From<&str> for ServiceState {
    fn from(s: &str) -> Self {
        match s {
            "running" => ServiceState::Running,
            "failed" => ServiceState::Failed,
            other => ServiceState::Other(other.to_string()),
        }
    }
}

/// One service entry of a `/status/v1/services` response
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ServiceStatus {
    #[serde(default)]
    pub state: Value,
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub active_alerts: Value,
}

impl ServiceStatus {
    /// Find the entry keyed by `service_name` in a parsed response body.
    ///
    /// Returns `None` when the body has no such key. An entry that is not an
    /// object is treated as having no fields at all.
    pub fn lookup(body: &Value, service_name: &str) -> Option<Self> {
        let entry = body.as_object()?.get(service_name)?;
        Some(Self::deserialize(entry).unwrap_or_default())
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from(self.state.as_str().unwrap_or_default())
    }

    /// The raw `state` value as printed in plugin output
    pub fn state_text(&self) -> String {
        render_value(&self.state)
    }

    /// `State:`, `Status:` and `Active_alerts:` lines
    pub fn diagnostic_lines(&self) -> [String; 3] {
        [
            format!("State: {}", render_value(&self.state)),
            format!("Status: {}", render_value(&self.status)),
            format!("Active_alerts: {}", render_value(&self.active_alerts)),
        ]
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Ok.code(), 0);
        assert_eq!(ExitStatus::Warning.code(), 1);
        assert_eq!(ExitStatus::Critical.code(), 2);
        assert_eq!(ExitStatus::Unknown.code(), 3);
        assert_eq!(ExitStatus::Critical.to_string(), "CRITICAL");
    }

    #[test]
    fn test_service_state_from_str() {
        assert_eq!(ServiceState::from("running"), ServiceState::Running);
        assert_eq!(ServiceState::from("failed"), ServiceState::Failed);
        assert_eq!(
            ServiceState::from("starting"),
            ServiceState::Other("starting".to_string())
        );
    }

    #[test]
    fn test_lookup_running_service() {
        let body = json!({"orchestrator-service": {"state": "running"}});
        let status = ServiceStatus::lookup(&body, "orchestrator-service").unwrap();

        assert_eq!(status.state(), ServiceState::Running);
        assert_eq!(status.status, Value::Null);
    }

    #[test]
    fn test_lookup_missing_service() {
        let body = json!({"puppetserver": {"state": "running"}});
        assert!(ServiceStatus::lookup(&body, "orchestrator-service").is_none());
        assert!(ServiceStatus::lookup(&json!([1, 2]), "orchestrator-service").is_none());
    }

    #[test]
    fn test_non_object_entry_has_no_state() {
        let body = json!({"puppetserver": "running"});
        let status = ServiceStatus::lookup(&body, "puppetserver").unwrap();

        assert_eq!(status.state(), ServiceState::Other(String::new()));
        assert_eq!(status.state_text(), "");
    }

    #[test]
    fn test_diagnostic_lines() {
        let body = json!({
            "puppetserver": {
                "state": "failed",
                "status": {"experimental": {"jvm-metrics": {}}},
                "active_alerts": [{"severity": "error"}],
                "service_version": "2023.8.0"
            }
        });
        let status = ServiceStatus::lookup(&body, "puppetserver").unwrap();

        assert_eq!(status.state(), ServiceState::Failed);
        assert_eq!(
            status.diagnostic_lines(),
            [
                "State: failed".to_string(),
                r#"Status: {"experimental":{"jvm-metrics":{}}}"#.to_string(),
                r#"Active_alerts: [{"severity":"error"}]"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let body = json!({"puppetserver": {"state": "degraded"}});
        let status = ServiceStatus::lookup(&body, "puppetserver").unwrap();

        assert_eq!(
            status.diagnostic_lines(),
            [
                "State: degraded".to_string(),
                "Status: ".to_string(),
                "Active_alerts: ".to_string(),
            ]
        );
    }
}
