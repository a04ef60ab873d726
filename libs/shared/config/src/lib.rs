use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl PortalConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("PORTAL_API_URL")
                .unwrap_or_else(|_| {
                    warn!("PORTAL_API_URL not set, using empty value");
                    String::new()
                }),
            request_timeout_secs: env::var("PORTAL_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        };

        if !config.is_configured() {
            warn!("Portal client not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_when_url_empty() {
        let config = PortalConfig {
            api_base_url: String::new(),
            request_timeout_secs: 30,
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn test_configured_with_url() {
        let config = PortalConfig {
            api_base_url: "http://localhost:4000".to_string(),
            request_timeout_secs: 30,
        };
        assert!(config.is_configured());
    }
}
