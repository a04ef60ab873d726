pub mod auth;
pub mod envelope;
pub mod error;

pub use auth::{AuthUser, PatientRef, SessionContext, UserRole};
pub use envelope::ApiEnvelope;
pub use error::ApiError;
