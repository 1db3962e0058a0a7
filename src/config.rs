//! Client configuration.
//!
//! All connection behaviour is controlled through [`ClientConfig`], built via
//! its [`ClientConfigBuilder`]. Setters clamp out-of-range values; `build()`
//! rejects what cannot be clamped (a malformed base URL).

use crate::error::ToolkitError;
use serde::{Deserialize, Serialize};

/// Default service host used by the original web front end.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Configuration for talking to the processing service.
///
/// # Example
/// ```rust
/// use pdf_toolkit::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("https://pdf.example.com")
///     .request_timeout_secs(120)
///     .build()
///     .unwrap();
/// assert_eq!(
///     config.endpoint_url("/api/pdf/merge"),
///     "https://pdf.example.com/api/pdf/merge"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme and host (and optional path prefix) of the service. Default: `http://localhost:5000`.
    pub base_url: String,

    /// Whole-request timeout in seconds. Default: 300.
    ///
    /// OCR rasterises and recognises every page server-side before the first
    /// response byte arrives, so a long scan easily takes minutes.
    pub request_timeout_secs: u64,

    /// TCP/TLS connect timeout in seconds. Default: 10.
    pub connect_timeout_secs: u64,

    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 300,
            connect_timeout_secs: 10,
            user_agent: concat!("pdf-toolkit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Absolute URL for an endpoint path such as `/api/pdf/ocr`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs.max(1);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ToolkitError> {
        let c = &self.config;
        let url = reqwest::Url::parse(&c.base_url).map_err(|e| {
            ToolkitError::InvalidConfig(format!("base URL '{}' is not a valid URL: {e}", c.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ToolkitError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.request_timeout_secs == 0 || c.connect_timeout_secs == 0 {
            return Err(ToolkitError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
