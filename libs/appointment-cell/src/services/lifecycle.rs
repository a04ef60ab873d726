use tracing::warn;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

/// Client-visible lifecycle rules. The portal may only take
/// scheduled/confirmed appointments to cancelled; completed and no_show
/// are server-driven transitions this side merely observes.
pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Gate an edit or cancellation before any network call is made.
    pub fn ensure_modifiable(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        if !appointment.status.is_editable() {
            warn!(
                "rejected modification of appointment {} in status {}",
                appointment.appointment_id, appointment.status
            );
            return Err(AppointmentError::NotEditable(appointment.status));
        }
        Ok(())
    }

    /// Statuses this client is allowed to request for an appointment in
    /// the given state.
    pub fn client_transitions(&self, status: AppointmentStatus) -> Vec<AppointmentStatus> {
        if status.is_editable() {
            vec![AppointmentStatus::Cancelled]
        } else {
            vec![]
        }
    }
}

impl Default for AppointmentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
