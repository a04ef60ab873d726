use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Three-valued availability result. `Unknown` means the check was
/// inconclusive; callers must not read it as a real negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
    Unknown,
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityStatus::Available => write!(f, "available"),
            AvailabilityStatus::Unavailable => write!(f, "unavailable"),
            AvailabilityStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A server-defined bookable window. Field names vary across deployments,
/// hence the aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default, alias = "start_time", alias = "slot_start")]
    pub scheduled_start: Option<DateTime<Utc>>,
    #[serde(default, alias = "end_time", alias = "slot_end")]
    pub scheduled_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub provider_id: Option<i64>,
}

/// Payload of `GET /appointments/availability/check`.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityCheckData {
    pub available: bool,
    #[serde(default)]
    pub available_slots: Option<Vec<Slot>>,
    #[serde(default)]
    pub conflicts: Option<Vec<serde_json::Value>>,
}

/// Outcome of a windowed availability check. `advisory` is set when the
/// remote check failed and the result is the fail-open default, so the
/// caller can warn that server-side validation will be the final word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCheck {
    pub available: bool,
    pub advisory: bool,
}

impl WindowCheck {
    pub fn status(&self) -> AvailabilityStatus {
        if self.advisory {
            AvailabilityStatus::Unknown
        } else if self.available {
            AvailabilityStatus::Available
        } else {
            AvailabilityStatus::Unavailable
        }
    }
}
