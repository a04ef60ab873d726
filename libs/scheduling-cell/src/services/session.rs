use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use appointment_cell::{Appointment, AppointmentStore, BookingInput};
use availability_cell::{AvailabilityResolver, AvailabilityStatus};
use calendar_cell::{CalendarState, DayAnnotation, DayAvailability, DayCell, MonthStep};
use chrono::Local;
use notification_cell::{NotificationFeed, PushEvent};
use shared_api::PortalClient;
use shared_models::{AuthUser, SessionContext};

use crate::models::{
    BookingWorkflow, Facility, IdentityBinding, ModalState, Provider, SessionError, UserNotice,
};
use crate::services::identity::IdentityResolver;
use crate::services::reference::ReferenceLoader;

/// Confirmation seam for destructive actions. The rendering layer
/// supplies the real dialog; a declined prompt must leave everything
/// untouched.
pub trait CancelPrompt {
    fn confirm_cancellation(&self, appointment: &Appointment) -> bool;
}

pub struct AlwaysConfirm;

impl CancelPrompt for AlwaysConfirm {
    fn confirm_cancellation(&self, _appointment: &Appointment) -> bool {
        true
    }
}

/// Orchestrates calendar, availability, appointments and notifications
/// for one signed-in user. Single-owner, event-driven: the embedding UI
/// calls in, remote calls suspend, nothing runs in the background.
pub struct SchedulingSession {
    ctx: SessionContext,
    identity: IdentityResolver,
    reference: ReferenceLoader,
    resolver: AvailabilityResolver,
    store: AppointmentStore,
    feed: NotificationFeed,
    calendar: CalendarState,
    // Append-only per day within a month; cleared on month navigation,
    // evicted per date by successful mutations.
    day_availability: HashMap<NaiveDate, AvailabilityStatus>,
    user: Option<AuthUser>,
    binding: Option<IdentityBinding>,
    facilities: Vec<Facility>,
    providers: Vec<Provider>,
    workflow: BookingWorkflow,
    prompt: Box<dyn CancelPrompt + Send + Sync>,
}

impl SchedulingSession {
    pub fn new(ctx: SessionContext, api: Arc<PortalClient>, today: NaiveDate) -> Self {
        Self::with_prompt(ctx, api, today, Box::new(AlwaysConfirm))
    }

    pub fn with_prompt(
        ctx: SessionContext,
        api: Arc<PortalClient>,
        today: NaiveDate,
        prompt: Box<dyn CancelPrompt + Send + Sync>,
    ) -> Self {
        Self {
            identity: IdentityResolver::new(Arc::clone(&api)),
            reference: ReferenceLoader::new(Arc::clone(&api)),
            resolver: AvailabilityResolver::new(Arc::clone(&api)),
            store: AppointmentStore::new(Arc::clone(&api)),
            feed: NotificationFeed::new(api),
            calendar: CalendarState::new(today),
            day_availability: HashMap::new(),
            user: None,
            binding: None,
            facilities: Vec::new(),
            providers: Vec::new(),
            workflow: BookingWorkflow::default(),
            prompt,
            ctx,
        }
    }

    /// Resolve identity once, load reference data, pull the initial
    /// working sets. Identity failure is fatal; everything else degrades
    /// into notices.
    pub async fn start(&mut self) -> Result<Vec<UserNotice>, SessionError> {
        let token = self.token()?;

        let resolved = self.identity.resolve(&self.ctx).await?;
        info!(
            "scheduling session started for user {} as {:?}",
            resolved.user.user_id, resolved.binding
        );
        self.user = Some(resolved.user);
        self.binding = Some(resolved.binding);

        self.facilities = self.reference.load_facilities(&token).await;
        self.providers = self.reference.load_providers(&token).await;

        let mut notices = Vec::new();
        if let Err(e) = self.store.refresh(&token).await {
            warn!("appointment list unavailable at startup: {}", e);
            notices.push(UserNotice::error(format!(
                "Could not load appointments: {}",
                e
            )));
        }
        if let Err(e) = self.feed.refresh(&token).await {
            warn!("notification feed unavailable at startup: {}", e);
        }
        Ok(notices)
    }

    // ----- calendar ---------------------------------------------------

    pub fn calendar(&self) -> &CalendarState {
        &self.calendar
    }

    /// Month navigation clears the day selection and the month-scoped
    /// availability cache.
    pub fn navigate_month(&mut self, step: MonthStep) {
        self.calendar.navigate(step);
        self.day_availability.clear();
    }

    /// Select a day and, for patients on a cache miss, resolve its
    /// availability. Returns the cached or freshly resolved status.
    pub async fn day_click(&mut self, date: NaiveDate) -> Option<AvailabilityStatus> {
        self.calendar.select(date);

        if !matches!(self.binding, Some(b) if b.is_patient()) {
            return self.day_availability.get(&date).copied();
        }
        if let Some(status) = self.day_availability.get(&date) {
            return Some(*status);
        }

        let token = self.token().ok()?;
        let has_local = self.store.has_active_booking_on(date);
        let status = match self.facilities.first().map(|f| f.facility_id) {
            Some(facility_id) => {
                self.resolver
                    .check_day(&token, facility_id, None, date, has_local)
                    .await
            }
            None if has_local => AvailabilityStatus::Available,
            None => AvailabilityStatus::Unknown,
        };
        debug!("day {} resolved as {}", date, status);
        self.day_availability.insert(date, status);
        Some(status)
    }

    /// Appointments on the currently selected day, or nothing when no day
    /// is selected.
    pub fn selected_appointments(&self) -> &[Appointment] {
        match self.calendar.selected() {
            Some(date) => self.store.by_day(date),
            None => &[],
        }
    }

    pub fn day_availability(&self, date: NaiveDate) -> Option<AvailabilityStatus> {
        self.day_availability.get(&date).copied()
    }

    /// Month grid annotated from the by-day index and the availability
    /// cache.
    pub fn grid(&self, today: NaiveDate) -> Vec<Option<DayCell>> {
        let cursor = self.calendar.cursor();
        let mut annotations = HashMap::new();
        for day in 1..=calendar_cell::days_in_month(cursor.year, cursor.month) {
            let Some(date) = NaiveDate::from_ymd_opt(cursor.year, cursor.month, day) else {
                continue;
            };
            let appointments = self.store.by_day(date);
            let availability = self.day_availability.get(&date).and_then(|s| match s {
                AvailabilityStatus::Available => Some(DayAvailability::Available),
                AvailabilityStatus::Unavailable => Some(DayAvailability::Unavailable),
                AvailabilityStatus::Unknown => None,
            });
            if appointments.is_empty() && availability.is_none() {
                continue;
            }
            let mut type_summary: Vec<String> = Vec::new();
            for appointment in appointments {
                let label = appointment.appointment_type.to_string();
                if !type_summary.contains(&label) {
                    type_summary.push(label);
                }
            }
            annotations.insert(
                date,
                DayAnnotation {
                    appointment_count: appointments.len(),
                    type_summary,
                    availability,
                },
            );
        }
        self.calendar.grid(today, &annotations)
    }

    // ----- booking workflow -------------------------------------------

    pub fn workflow(&self) -> &BookingWorkflow {
        &self.workflow
    }

    /// Open the add-appointment form, pre-filled with the selected day
    /// and the role-bound identity defaults.
    pub fn open_add(&mut self) -> Option<BookingInput> {
        if !self.workflow.open_add() {
            return None;
        }
        let mut input = BookingInput {
            date: self.calendar.selected(),
            ..BookingInput::default()
        };
        if let Some(binding) = self.binding {
            binding.apply(&mut input);
        }
        Some(input)
    }

    /// Open the edit form for one appointment. Terminal appointments are
    /// rejected here, before anything reaches the network.
    pub fn open_edit(&mut self, appointment_id: i64) -> Result<BookingInput, UserNotice> {
        let appointment = self
            .store
            .get(appointment_id)
            .ok_or_else(|| UserNotice::error("Appointment not found."))?;
        if !appointment.status.is_editable() {
            return Err(UserNotice::error(format!(
                "An appointment in status '{}' can no longer be changed.",
                appointment.status
            )));
        }
        let appointment = appointment.clone();
        if !self.workflow.open_edit(appointment_id) {
            return Err(UserNotice::info("Another form is already open."));
        }

        let local_start = appointment.scheduled_start.with_timezone(&Local);
        let mut input = BookingInput {
            patient_id: Some(appointment.patient_id),
            provider_id: appointment.provider_id,
            facility_id: Some(appointment.facility_id),
            appointment_type: Some(appointment.appointment_type),
            date: Some(local_start.date_naive()),
            time: Some(local_start.time()),
            duration_minutes: Some(appointment.duration_minutes),
            reason: appointment.reason.clone(),
            notes: appointment.notes.clone(),
        };
        if let Some(binding) = self.binding {
            binding.apply(&mut input);
        }
        Ok(input)
    }

    pub fn close_modal(&mut self) {
        self.workflow.close();
    }

    /// Submit the add form. Success closes the modal and evicts the
    /// availability cache for the booked day; failure keeps the modal
    /// open with the error on display.
    pub async fn submit_booking(&mut self, mut input: BookingInput) -> UserNotice {
        if self.workflow.modal() != ModalState::AddOpen {
            return UserNotice::error("No booking form is open.");
        }
        let token = match self.token() {
            Ok(token) => token,
            Err(_) => return UserNotice::error("Your session has expired; please sign in again."),
        };
        if let Some(binding) = self.binding {
            binding.apply(&mut input);
        }

        match self.store.create(&token, &input).await {
            Ok(outcome) => {
                self.day_availability
                    .remove(&outcome.appointment.civil_date());
                self.workflow.submit_succeeded();
                match outcome.warning {
                    Some(warning) => {
                        UserNotice::warning(format!("Appointment booked. {}", warning))
                    }
                    None => UserNotice::success("Appointment booked."),
                }
            }
            Err(e) => {
                let message = e.to_string();
                self.workflow.submit_failed(&message);
                UserNotice::error(message)
            }
        }
    }

    /// Submit the edit form for the appointment the modal was opened on.
    pub async fn submit_edit(&mut self, mut input: BookingInput) -> UserNotice {
        let ModalState::EditOpen(appointment_id) = self.workflow.modal() else {
            return UserNotice::error("No edit form is open.");
        };
        let token = match self.token() {
            Ok(token) => token,
            Err(_) => return UserNotice::error("Your session has expired; please sign in again."),
        };
        if let Some(binding) = self.binding {
            binding.apply(&mut input);
        }

        match self.store.update(&token, appointment_id, &input).await {
            Ok(outcome) => {
                self.day_availability
                    .remove(&outcome.appointment.civil_date());
                self.workflow.submit_succeeded();
                match outcome.warning {
                    Some(warning) => {
                        UserNotice::warning(format!("Appointment updated. {}", warning))
                    }
                    None => UserNotice::success("Appointment updated."),
                }
            }
            Err(e) => {
                let message = e.to_string();
                self.workflow.submit_failed(&message);
                UserNotice::error(message)
            }
        }
    }

    /// Cancel an appointment after explicit confirmation. A declined
    /// prompt changes nothing and sends nothing.
    pub async fn request_cancel(&mut self, appointment_id: i64, reason: &str) -> UserNotice {
        let Some(appointment) = self.store.get(appointment_id).cloned() else {
            return UserNotice::error("Appointment not found.");
        };
        if !self.prompt.confirm_cancellation(&appointment) {
            debug!("cancellation of {} not confirmed", appointment_id);
            return UserNotice::info("Cancellation not confirmed; the appointment is unchanged.");
        }
        let token = match self.token() {
            Ok(token) => token,
            Err(_) => return UserNotice::error("Your session has expired; please sign in again."),
        };

        match self.store.cancel(&token, appointment_id, reason).await {
            Ok(cancelled) => {
                self.day_availability.remove(&cancelled.civil_date());
                UserNotice::success("Appointment cancelled.")
            }
            Err(e) => UserNotice::error(e.to_string()),
        }
    }

    // ----- notifications ----------------------------------------------

    /// Push events re-pull the feed; a failed re-pull degrades to the
    /// last-known list.
    pub async fn handle_push(&mut self, event: PushEvent) {
        let Ok(token) = self.token() else { return };
        if let Err(e) = self.feed.on_push(&token, event).await {
            warn!("push-triggered refresh failed: {}", e);
        }
    }

    /// Clicking a notification acknowledges it as read.
    pub async fn notification_click(&mut self, message_id: &str) -> UserNotice {
        let token = match self.token() {
            Ok(token) => token,
            Err(_) => return UserNotice::error("Your session has expired; please sign in again."),
        };
        match self.feed.mark_read(&token, message_id).await {
            Ok(()) => UserNotice::info("Notification read."),
            Err(e) => UserNotice::error(e.to_string()),
        }
    }

    // ----- accessors ---------------------------------------------------

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn binding(&self) -> Option<IdentityBinding> {
        self.binding
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn store(&self) -> &AppointmentStore {
        &self.store
    }

    pub fn feed(&self) -> &NotificationFeed {
        &self.feed
    }

    /// End the session: the injected context is cleared, nothing ambient
    /// survives.
    pub fn logout(&mut self) {
        self.ctx.logout();
        self.user = None;
        self.binding = None;
    }

    fn token(&self) -> Result<String, SessionError> {
        self.ctx
            .token()
            .map(str::to_owned)
            .ok_or(SessionError::NotAuthenticated)
    }
}
