use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};

use availability_cell::{AvailabilityResolver, WindowCheck};
use shared_api::PortalClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookingInput, BookingOutcome,
};
use crate::services::lifecycle::AppointmentLifecycle;

/// In-memory working set of the session's appointments, with a by-day
/// index derived on every mutation. The remote system of record stays
/// authoritative: local state changes only after a confirmed success
/// response.
pub struct AppointmentStore {
    api: Arc<PortalClient>,
    resolver: AvailabilityResolver,
    lifecycle: AppointmentLifecycle,
    appointments: Vec<Appointment>,
    by_day: HashMap<NaiveDate, Vec<Appointment>>,
}

impl AppointmentStore {
    pub fn new(api: Arc<PortalClient>) -> Self {
        let resolver = AvailabilityResolver::new(Arc::clone(&api));
        Self {
            api,
            resolver,
            lifecycle: AppointmentLifecycle::new(),
            appointments: Vec::new(),
            by_day: HashMap::new(),
        }
    }

    /// Re-pull the full working set. The list and its by-day index are
    /// swapped in together; callers never observe one without the other.
    pub async fn refresh(&mut self, auth_token: &str) -> Result<(), AppointmentError> {
        debug!("refreshing appointment list");
        let list: Vec<Appointment> = self
            .api
            .fetch_data(Method::GET, "/appointments", Some(auth_token), None)
            .await?;
        self.replace_all(list);
        Ok(())
    }

    pub fn list(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get(&self, appointment_id: i64) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|a| a.appointment_id == appointment_id)
    }

    /// Appointments on one civil date (local time).
    pub fn by_day(&self, date: NaiveDate) -> &[Appointment] {
        self.by_day.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when the date holds at least one non-cancelled appointment,
    /// which is the local evidence the day resolver short-circuits on.
    pub fn has_active_booking_on(&self, date: NaiveDate) -> bool {
        self.by_day(date)
            .iter()
            .any(|a| a.status != AppointmentStatus::Cancelled)
    }

    /// Non-terminal appointments starting at or after `now`, soonest first.
    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<&Appointment> {
        let mut upcoming: Vec<&Appointment> = self
            .appointments
            .iter()
            .filter(|a| !a.status.is_terminal() && a.scheduled_start >= now)
            .collect();
        upcoming.sort_by_key(|a| a.scheduled_start);
        upcoming
    }

    /// Book a new appointment. The availability pre-check is advisory:
    /// its outcome becomes a warning, never a veto. The server validates
    /// authoritatively at submit time.
    pub async fn create(
        &mut self,
        auth_token: &str,
        input: &BookingInput,
    ) -> Result<BookingOutcome, AppointmentError> {
        let payload = input.assemble()?;

        let check = self
            .resolver
            .check_window(
                auth_token,
                payload.facility_id,
                payload.provider_id,
                payload.scheduled_start,
                payload.scheduled_end,
            )
            .await;
        let warning = precheck_warning(check);

        let body = serde_json::to_value(&payload)
            .map_err(|e| AppointmentError::Validation(e.to_string()))?;
        let created: Appointment = self
            .api
            .fetch_data(Method::POST, "/appointments", Some(auth_token), Some(body))
            .await?;

        info!(
            "appointment {} booked for {}",
            created.appointment_id, created.scheduled_start
        );
        self.appointments.push(created.clone());
        self.rebuild_index();

        Ok(BookingOutcome {
            appointment: created,
            warning,
        })
    }

    /// Edit an existing appointment. Rejected locally, before any network
    /// call, when the appointment is no longer in an editable status.
    pub async fn update(
        &mut self,
        auth_token: &str,
        appointment_id: i64,
        input: &BookingInput,
    ) -> Result<BookingOutcome, AppointmentError> {
        let current = self
            .get(appointment_id)
            .ok_or(AppointmentError::NotFound)?;
        self.lifecycle.ensure_modifiable(current)?;

        let payload = input.assemble()?;

        let check = self
            .resolver
            .check_window(
                auth_token,
                payload.facility_id,
                payload.provider_id,
                payload.scheduled_start,
                payload.scheduled_end,
            )
            .await;
        let warning = precheck_warning(check);

        let body = serde_json::to_value(&payload)
            .map_err(|e| AppointmentError::Validation(e.to_string()))?;
        let path = format!("/appointments/{}", appointment_id);
        let updated: Appointment = self
            .api
            .fetch_data(Method::PUT, &path, Some(auth_token), Some(body))
            .await?;

        info!("appointment {} updated", appointment_id);
        self.appointments
            .retain(|a| a.appointment_id != appointment_id);
        self.appointments.push(updated.clone());
        self.rebuild_index();

        Ok(BookingOutcome {
            appointment: updated,
            warning,
        })
    }

    /// Cancel an appointment. The reason is mandatory and forwarded; the
    /// status flips to cancelled only on server acknowledgment.
    pub async fn cancel(
        &mut self,
        auth_token: &str,
        appointment_id: i64,
        reason: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self
            .get(appointment_id)
            .ok_or(AppointmentError::NotFound)?;
        self.lifecycle.ensure_modifiable(current)?;

        if reason.trim().is_empty() {
            return Err(AppointmentError::MissingCancellationReason);
        }

        let path = format!("/appointments/{}", appointment_id);
        self.api
            .fetch_ack(
                Method::DELETE,
                &path,
                Some(auth_token),
                Some(json!({ "cancellation_reason": reason })),
            )
            .await?;

        info!("appointment {} cancelled", appointment_id);
        let mut cancelled = None;
        for appointment in &mut self.appointments {
            if appointment.appointment_id == appointment_id {
                appointment.status = AppointmentStatus::Cancelled;
                appointment.reason = Some(reason.to_string());
                cancelled = Some(appointment.clone());
            }
        }
        self.rebuild_index();

        // The appointment existed before the call; if it has vanished from
        // the working set something refreshed underneath us.
        cancelled.ok_or(AppointmentError::NotFound)
    }

    fn replace_all(&mut self, list: Vec<Appointment>) {
        let mut by_day: HashMap<NaiveDate, Vec<Appointment>> = HashMap::new();
        for appointment in &list {
            by_day
                .entry(appointment.civil_date())
                .or_default()
                .push(appointment.clone());
        }
        for entries in by_day.values_mut() {
            entries.sort_by_key(|a| a.scheduled_start);
        }
        self.appointments = list;
        self.by_day = by_day;
    }

    fn rebuild_index(&mut self) {
        let list = std::mem::take(&mut self.appointments);
        self.replace_all(list);
    }
}

fn precheck_warning(check: WindowCheck) -> Option<String> {
    if check.advisory {
        warn!("availability pre-check inconclusive; deferring to server validation");
        Some(
            "Availability could not be verified; the booking will be validated on submission."
                .to_string(),
        )
    } else if !check.available {
        Some(
            "The selected time appears unavailable; the server will make the final decision."
                .to_string(),
        )
    } else {
        None
    }
}
