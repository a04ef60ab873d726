use serde::{Deserialize, Serialize};

/// Role carried by `/auth/me`. Anything that is neither a patient nor a
/// physician is treated as generic staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Patient,
    Physician,
    #[serde(other)]
    Staff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRef {
    pub patient_id: i64,
}

/// Identity record as returned by `GET /auth/me`. The `patient_id` may be
/// present directly, nested under `patient`, or missing entirely (in which
/// case `/profile/me` is the fallback).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AuthUser {
    /// Patient id from either the direct field or the nested record.
    pub fn resolved_patient_id(&self) -> Option<i64> {
        self.patient_id
            .or_else(|| self.patient.as_ref().map(|p| p.patient_id))
    }
}

/// Explicitly injected session state: the persisted auth token and the
/// cached identity blob. Populated at login, cleared at logout; read-only
/// for everything downstream.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    auth_token: Option<String>,
    cached_user: Option<AuthUser>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(token: impl Into<String>, cached_user: Option<AuthUser>) -> Self {
        Self {
            auth_token: Some(token.into()),
            cached_user,
        }
    }

    pub fn logout(&mut self) {
        self.auth_token = None;
        self.cached_user = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn cached_user(&self) -> Option<&AuthUser> {
        self.cached_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }
}
