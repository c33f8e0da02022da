//! Audit events for access decisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One authorization outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Principal identifier, `None` for an anonymous caller
    pub principal: Option<String>,
    pub resource: String,
    pub action: String,
    pub granted: bool,
    pub at: DateTime<Utc>,
}

impl AccessEvent {
    pub fn new(principal: Option<String>, resource: &str, action: &str, granted: bool) -> Self {
        Self {
            principal,
            resource: resource.to_string(),
            action: action.to_string(),
            granted,
            at: Utc::now(),
        }
    }
}

/// Receiver of access events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AccessEvent);
}

/// Writes events through the `log` facade as single-line JSON
///
/// Denials go out at `warn`, grants at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, event: &AccessEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to serialize access event: {}", e);
                return;
            }
        };
        if event.granted {
            log::debug!(target: "rampart::audit", "{}", line);
        } else {
            log::warn!(target: "rampart::audit", "{}", line);
        }
    }
}
