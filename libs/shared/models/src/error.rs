use thiserror::Error;

/// Error taxonomy for calls against the portal API.
///
/// Every variant carries message text so callers can surface a
/// user-facing notice without re-interrogating the transport layer.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for 400-class structured rejections (including envelope
    /// `success: false` bodies), which carry the server message verbatim.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }

    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::Auth(body),
            404 => ApiError::NotFound(body),
            _ => ApiError::Rejected {
                status,
                message: body,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_status_mapping() {
        assert_matches!(ApiError::from_status(401, "x".into()), ApiError::Auth(_));
        assert_matches!(ApiError::from_status(403, "x".into()), ApiError::Auth(_));
        assert_matches!(
            ApiError::from_status(404, "x".into()),
            ApiError::NotFound(_)
        );
        assert_matches!(
            ApiError::from_status(409, "x".into()),
            ApiError::Rejected { status: 409, .. }
        );
    }

    #[test]
    fn test_rejection_keeps_message_verbatim() {
        let err = ApiError::from_status(400, "Slot no longer available".into());
        assert_eq!(err.to_string(), "Slot no longer available");
        assert!(err.is_rejection());
    }
}
