use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const HEALTHY: &str = "healthy";
pub const SUCCESS: &str = "success";
pub const ERROR: &str = "error";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
}

impl Health {
    pub fn healthy(service: &str) -> Self {
        Self {
            status: HEALTHY.to_string(),
            service: service.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Answer of the manual trigger endpoints.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Trigger<R> {
    pub status: String,
    pub message: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub report: Option<R>,
}

impl<R> Trigger<R> {
    pub fn success(message: impl Into<String>, report: R) -> Self {
        Self {
            status: SUCCESS.to_string(),
            message: message.into(),
            report: Some(report),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ERROR.to_string(),
            message: message.into(),
            report: None,
        }
    }
}

/// Outcome of one recording batch.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub found: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Outcome of one camera reconciliation pass.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub eligible: usize,
    pub active: usize,
    pub started: usize,
    pub failed: usize,
}
