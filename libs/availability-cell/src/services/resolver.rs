use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use tracing::{debug, warn};

use shared_api::{encode_query_ts, PortalClient};
use shared_models::ApiError;

use crate::models::{AvailabilityCheckData, AvailabilityStatus, Slot, WindowCheck};

/// Resolves whether a booking window or a whole day can be booked. The
/// remote system of record stays authoritative: every inconclusive check
/// fails open and defers to the booking call itself.
pub struct AvailabilityResolver {
    api: Arc<PortalClient>,
}

impl AvailabilityResolver {
    pub fn new(api: Arc<PortalClient>) -> Self {
        Self { api }
    }

    /// Check one booking window.
    ///
    /// Precedence: reported conflicts win, then an explicitly empty slot
    /// list, otherwise the window is available. Absence of slot data is not
    /// evidence of unavailability.
    pub async fn check_window(
        &self,
        auth_token: &str,
        facility_id: i64,
        provider_id: Option<i64>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> WindowCheck {
        match self
            .query_window(auth_token, facility_id, provider_id, start, end)
            .await
        {
            Ok(data) => {
                let has_conflicts = data.conflicts.as_ref().is_some_and(|c| !c.is_empty());
                let slots_defined_but_empty =
                    data.available_slots.as_ref().is_some_and(|s| s.is_empty());

                let available = !has_conflicts && !slots_defined_but_empty;
                if available != data.available {
                    debug!(
                        "availability derivation ({}) disagrees with server flag ({}) for facility {}",
                        available, data.available, facility_id
                    );
                }
                WindowCheck {
                    available,
                    advisory: false,
                }
            }
            Err(e) => {
                warn!(
                    "availability check failed for facility {}, failing open: {}",
                    facility_id, e
                );
                WindowCheck {
                    available: true,
                    advisory: true,
                }
            }
        }
    }

    /// Resolve a whole calendar day.
    ///
    /// `has_local_booking` short-circuits the network call: a non-cancelled
    /// appointment already booked on that civil date is enough local
    /// evidence that the day takes bookings.
    pub async fn check_day(
        &self,
        auth_token: &str,
        facility_id: i64,
        provider_id: Option<i64>,
        date: NaiveDate,
        has_local_booking: bool,
    ) -> AvailabilityStatus {
        if has_local_booking {
            debug!("day {} resolved locally: existing booking present", date);
            return AvailabilityStatus::Available;
        }

        match self
            .query_slots(auth_token, facility_id, provider_id, date)
            .await
        {
            Ok(Some(slots)) if slots.is_empty() => AvailabilityStatus::Unavailable,
            Ok(Some(_)) => AvailabilityStatus::Available,
            // No defined slots for this facility: not evidence either way.
            Ok(None) => AvailabilityStatus::Available,
            Err(e) => {
                warn!("slot query failed for {} on {}: {}", facility_id, date, e);
                AvailabilityStatus::Unknown
            }
        }
    }

    async fn query_window(
        &self,
        auth_token: &str,
        facility_id: i64,
        provider_id: Option<i64>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AvailabilityCheckData, ApiError> {
        let mut query_parts = vec![
            format!("facility_id={}", facility_id),
            format!("scheduled_start={}", encode_query_ts(&start)),
            format!("scheduled_end={}", encode_query_ts(&end)),
        ];
        if let Some(provider_id) = provider_id {
            query_parts.push(format!("provider_id={}", provider_id));
        }

        let path = format!(
            "/appointments/availability/check?{}",
            query_parts.join("&")
        );
        self.api
            .fetch_data(Method::GET, &path, Some(auth_token), None)
            .await
    }

    async fn query_slots(
        &self,
        auth_token: &str,
        facility_id: i64,
        provider_id: Option<i64>,
        date: NaiveDate,
    ) -> Result<Option<Vec<Slot>>, ApiError> {
        let mut query_parts = vec![
            format!("facility_id={}", facility_id),
            format!("date={}", date.format("%Y-%m-%d")),
        ];
        if let Some(provider_id) = provider_id {
            query_parts.push(format!("provider_id={}", provider_id));
        }

        let path = format!(
            "/appointments/availability/slots?{}",
            query_parts.join("&")
        );
        let envelope: shared_models::ApiEnvelope<Vec<Slot>> = self
            .api
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "Request was not successful".to_string());
            return Err(ApiError::Rejected {
                status: 400,
                message,
            });
        }
        Ok(envelope.data)
    }
}
