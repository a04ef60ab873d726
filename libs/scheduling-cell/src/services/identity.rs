use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use shared_api::PortalClient;
use shared_models::{AuthUser, PatientRef, SessionContext, UserRole};

use crate::models::{IdentityBinding, SessionError};

// /auth/me wraps the identity under `user`, not `data`.
#[derive(Debug, Deserialize)]
struct AuthMeResponse {
    success: bool,
    #[serde(default)]
    user: Option<AuthUser>,
}

// /profile/me wraps the fallback record under `patient`.
#[derive(Debug, Deserialize)]
struct ProfileMeResponse {
    success: bool,
    #[serde(default)]
    patient: Option<PatientRef>,
}

#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub user: AuthUser,
    pub binding: IdentityBinding,
}

/// Resolves who is booking, once, at session start. A patient without a
/// `patient_id` on the primary record falls back to the profile lookup; a
/// physician is always bound to their own user id.
pub struct IdentityResolver {
    api: Arc<PortalClient>,
}

impl IdentityResolver {
    pub fn new(api: Arc<PortalClient>) -> Self {
        Self { api }
    }

    pub async fn resolve(&self, ctx: &SessionContext) -> Result<ResolvedIdentity, SessionError> {
        let token = ctx.token().ok_or(SessionError::NotAuthenticated)?;

        let user = match self.fetch_me(token).await {
            Ok(user) => user,
            Err(e) => {
                // The cached identity blob keeps the session usable when
                // the identity endpoint is briefly unreachable.
                if let Some(cached) = ctx.cached_user() {
                    warn!("identity endpoint failed ({}), using cached identity", e);
                    cached.clone()
                } else {
                    return Err(SessionError::Identity(e));
                }
            }
        };

        let binding = match user.role {
            UserRole::Patient => {
                let patient_id = match user.resolved_patient_id() {
                    Some(id) => id,
                    None => self.fetch_profile_patient_id(token).await?,
                };
                IdentityBinding::Patient { patient_id }
            }
            UserRole::Physician => IdentityBinding::Physician {
                provider_id: user.user_id,
            },
            UserRole::Staff => IdentityBinding::Staff,
        };

        debug!("identity resolved: user {} as {:?}", user.user_id, binding);
        Ok(ResolvedIdentity { user, binding })
    }

    async fn fetch_me(&self, token: &str) -> Result<AuthUser, String> {
        let response: AuthMeResponse = self
            .api
            .request(Method::GET, "/auth/me", Some(token), None)
            .await
            .map_err(|e| e.to_string())?;
        if !response.success {
            return Err("identity endpoint reported failure".to_string());
        }
        response
            .user
            .ok_or_else(|| "identity endpoint returned no user".to_string())
    }

    async fn fetch_profile_patient_id(&self, token: &str) -> Result<i64, SessionError> {
        let response: ProfileMeResponse = self
            .api
            .request(Method::GET, "/profile/me", Some(token), None)
            .await
            .map_err(|e| SessionError::Identity(e.to_string()))?;
        response
            .patient
            .filter(|_| response.success)
            .map(|p| p.patient_id)
            .ok_or_else(|| {
                SessionError::Identity("no patient record on either identity endpoint".to_string())
            })
    }
}
