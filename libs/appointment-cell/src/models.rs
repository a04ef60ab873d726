use std::fmt;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use shared_models::ApiError;

pub const DEFAULT_DURATION_MINUTES: i32 = 30;
pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 240;
pub const DURATION_STEP_MINUTES: i32 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: i64,
    pub patient_id: i64,
    #[serde(default)]
    pub provider_id: Option<i64>,
    pub facility_id: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Calendar day the appointment falls on, in local time. Day indexing
    /// and availability caching key on this, never on the raw timestamp.
    pub fn civil_date(&self) -> NaiveDate {
        self.scheduled_start.with_timezone(&Local).date_naive()
    }

    /// Invariant check: `scheduled_end = scheduled_start + duration_minutes`.
    pub fn times_agree(&self) -> bool {
        self.scheduled_start + Duration::minutes(self.duration_minutes as i64)
            == self.scheduled_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Only scheduled and confirmed appointments may be edited or
    /// cancelled by the portal user; every other transition is
    /// server-driven and merely observed here.
    pub fn is_editable(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[serde(alias = "initial_visit", alias = "new_patient")]
    Initial,
    #[serde(alias = "followup")]
    FollowUp,
    #[serde(alias = "art_refill")]
    ArtPickup,
    #[serde(alias = "lab", alias = "laboratory")]
    LabTest,
    Counseling,
    #[serde(alias = "other")]
    General,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Initial => write!(f, "initial"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
            AppointmentType::ArtPickup => write!(f, "art_pickup"),
            AppointmentType::LabTest => write!(f, "lab_test"),
            AppointmentType::Counseling => write!(f, "counseling"),
            AppointmentType::General => write!(f, "general"),
        }
    }
}

/// Raw booking form state. Identity fields are filled in by the session
/// according to the user's role before submission.
#[derive(Debug, Clone, Default)]
pub struct BookingInput {
    pub patient_id: Option<i64>,
    pub provider_id: Option<i64>,
    pub facility_id: Option<i64>,
    pub appointment_type: Option<AppointmentType>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl BookingInput {
    /// Validate the form and assemble the wire payload. The scheduled end
    /// is always derived from start + duration so the two can never
    /// disagree.
    pub fn assemble(&self) -> Result<BookingPayload, AppointmentError> {
        let facility_id = self
            .facility_id
            .ok_or(AppointmentError::MissingField("facility_id"))?;
        let patient_id = self
            .patient_id
            .ok_or(AppointmentError::MissingField("patient_id"))?;
        let appointment_type = self
            .appointment_type
            .ok_or(AppointmentError::MissingField("appointment_type"))?;
        let date = self.date.ok_or(AppointmentError::MissingField("date"))?;
        let time = self.time.ok_or(AppointmentError::MissingField("time"))?;

        let duration_minutes = self.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(AppointmentError::Validation(format!(
                "duration must be between {} and {} minutes",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
            )));
        }
        if duration_minutes % DURATION_STEP_MINUTES != 0 {
            return Err(AppointmentError::Validation(format!(
                "duration must be a multiple of {} minutes",
                DURATION_STEP_MINUTES
            )));
        }

        let scheduled_start = Local
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .ok_or_else(|| {
                AppointmentError::Validation("selected time does not exist locally".to_string())
            })?
            .with_timezone(&Utc);
        let scheduled_end = scheduled_start + Duration::minutes(duration_minutes as i64);

        Ok(BookingPayload {
            patient_id,
            provider_id: self.provider_id,
            facility_id,
            appointment_type,
            scheduled_start,
            scheduled_end,
            duration_minutes,
            reason: self.reason.clone(),
            notes: self.notes.clone(),
        })
    }
}

/// Validated request body for `POST /appointments` and
/// `PUT /appointments/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct BookingPayload {
    pub patient_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<i64>,
    pub facility_id: i64,
    pub appointment_type: AppointmentType,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub duration_minutes: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Result of a create/update: the confirmed appointment plus an optional
/// advisory warning from the availability pre-check. The warning never
/// blocks the submission.
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub appointment: Appointment,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Slot no longer available: {0}")]
    Conflict(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Appointment cannot be modified in status '{0}'")]
    NotEditable(AppointmentStatus),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("A cancellation reason is required")]
    MissingCancellationReason,
}

impl From<ApiError> for AppointmentError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(msg) | ApiError::Decode(msg) => AppointmentError::Transport(msg),
            ApiError::NotFound(_) => AppointmentError::NotFound,
            ApiError::Auth(msg) => AppointmentError::Auth(msg),
            ApiError::Rejected { status: 409, message } => AppointmentError::Conflict(message),
            ApiError::Rejected { message, .. } => AppointmentError::Validation(message),
        }
    }
}
