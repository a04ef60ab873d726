use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, warn};

use shared_api::PortalClient;

use crate::models::{Facility, Provider};

/// Loads read-mostly reference data. Absence degrades to an empty list
/// rather than an error.
pub struct ReferenceLoader {
    api: Arc<PortalClient>,
}

impl ReferenceLoader {
    pub fn new(api: Arc<PortalClient>) -> Self {
        Self { api }
    }

    pub async fn load_facilities(&self, auth_token: &str) -> Vec<Facility> {
        match self
            .api
            .fetch_data::<Vec<Facility>>(Method::GET, "/facilities", Some(auth_token), None)
            .await
        {
            Ok(facilities) => facilities,
            Err(e) => {
                warn!("facility list unavailable: {}", e);
                Vec::new()
            }
        }
    }

    /// Providers come from the dedicated endpoint when it exists, falling
    /// back silently to the general user listing filtered to physicians.
    pub async fn load_providers(&self, auth_token: &str) -> Vec<Provider> {
        match self
            .api
            .fetch_data::<Vec<Provider>>(Method::GET, "/users/providers", Some(auth_token), None)
            .await
        {
            Ok(providers) => providers,
            Err(e) => {
                debug!("provider endpoint unavailable ({}), trying user listing", e);
                self.load_providers_from_users(auth_token).await
            }
        }
    }

    async fn load_providers_from_users(&self, auth_token: &str) -> Vec<Provider> {
        match self
            .api
            .fetch_data::<Vec<Provider>>(Method::GET, "/users", Some(auth_token), None)
            .await
        {
            Ok(users) => users
                .into_iter()
                .filter(|u| u.role.as_deref() == Some("physician"))
                .collect(),
            Err(e) => {
                warn!("provider fallback unavailable: {}", e);
                Vec::new()
            }
        }
    }
}
