use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Standard response wrapper used by every portal endpoint:
/// `{ success, data?, message? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the envelope, turning `success: false` into a rejection that
    /// carries the server message verbatim where one is present.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            let message = self
                .message
                .unwrap_or_else(|| "Request was not successful".to_string());
            return Err(ApiError::Rejected {
                status: 400,
                message,
            });
        }
        self.data.ok_or_else(|| {
            ApiError::Decode("response envelope was successful but carried no data".to_string())
        })
    }

    /// For acknowledgment-only endpoints where `data` may be absent.
    pub fn into_ack(self) -> Result<(), ApiError> {
        if !self.success {
            let message = self
                .message
                .unwrap_or_else(|| "Request was not successful".to_string());
            return Err(ApiError::Rejected {
                status: 400,
                message,
            });
        }
        Ok(())
    }
}
