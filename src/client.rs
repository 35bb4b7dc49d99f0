use reqwest::blocking::{Client, ClientBuilder};
use std::collections::HashMap;
use std::time::Duration;

/// Default REST service endpoint for sandbox mode
pub const SANDBOX_ENDPOINT: &str = "https://api.sandbox.paypal.com";

/// Default REST service endpoint for live mode
pub const LIVE_ENDPOINT: &str = "https://api.paypal.com";

/// Create the default HTTP client for REST API requests
/// with optimized settings for connection pooling and timeouts
pub fn create_rest_client() -> Client {
    ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(Duration::from_secs(300)) // 5 minutes
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
}

/// API mode selecting the default service endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    Sandbox,
    Live,
}

impl ApiMode {
    /// Get the default REST endpoint for this mode
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ApiMode::Sandbox => SANDBOX_ENDPOINT,
            ApiMode::Live => LIVE_ENDPOINT,
        }
    }
}

/// Configuration for the REST API client.
/// Credentials and endpoint overrides are immutable for the lifetime
/// of a client instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// API mode (sandbox or live)
    pub mode: ApiMode,
    /// OAuth2 client id
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Override for the REST service endpoint
    pub rest_endpoint: Option<String>,
    /// Override for the OAuth2 token endpoint
    pub rest_token_endpoint: Option<String>,
    /// Auxiliary credential properties (e.g. sandbox email, device IP),
    /// keyed symbolically and mapped onto wire header names at request time
    pub auxiliary: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: ApiMode::Sandbox,
            client_id: String::new(),
            client_secret: String::new(),
            rest_endpoint: None,
            rest_token_endpoint: None,
            auxiliary: HashMap::new(),
        }
    }
}

impl Config {
    /// Create a new configuration with the given mode and credentials
    pub fn new(mode: ApiMode, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Config {
            mode,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            rest_endpoint: None,
            rest_token_endpoint: None,
            auxiliary: HashMap::new(),
        }
    }

    /// Override the REST service endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.rest_endpoint = Some(endpoint.into());
        self
    }

    /// Override the OAuth2 token endpoint
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.rest_token_endpoint = Some(endpoint.into());
        self
    }

    /// Add an auxiliary credential property
    pub fn with_auxiliary(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.auxiliary.insert(key.into(), value.into());
        self
    }

    /// REST service endpoint: the configured override or the per-mode default
    pub fn service_endpoint(&self) -> String {
        self.rest_endpoint
            .clone()
            .unwrap_or_else(|| self.mode.default_endpoint().to_string())
    }

    /// OAuth2 token endpoint: the configured override or the service endpoint
    pub fn token_endpoint(&self) -> String {
        self.rest_token_endpoint
            .clone()
            .unwrap_or_else(|| self.service_endpoint())
    }

    /// Check if a client id is configured
    pub fn has_client_id(&self) -> bool {
        !self.client_id.is_empty()
    }
}

/// Resolves auxiliary credential properties for a request URI.
/// Properties are emitted as extra authentication headers on outbound requests.
pub trait CredentialResolver: Send + Sync {
    /// Auxiliary properties to apply to a request against `uri`
    fn properties(&self, uri: &str) -> HashMap<String, String>;
}

impl CredentialResolver for Config {
    fn properties(&self, _uri: &str) -> HashMap<String, String> {
        self.auxiliary.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = Config::default();
        assert_eq!(config.service_endpoint(), SANDBOX_ENDPOINT);
        assert_eq!(config.token_endpoint(), SANDBOX_ENDPOINT);

        let config = Config::new(ApiMode::Live, "id", "secret");
        assert_eq!(config.service_endpoint(), LIVE_ENDPOINT);
    }

    #[test]
    fn test_endpoint_overrides() {
        let config = Config::new(ApiMode::Sandbox, "id", "secret")
            .with_endpoint("https://api.example.com");
        assert_eq!(config.service_endpoint(), "https://api.example.com");
        // Token endpoint falls back to the service endpoint override
        assert_eq!(config.token_endpoint(), "https://api.example.com");

        let config = config.with_token_endpoint("https://auth.example.com/oauth/token");
        assert_eq!(config.token_endpoint(), "https://auth.example.com/oauth/token");
        assert_eq!(config.service_endpoint(), "https://api.example.com");
    }

    #[test]
    fn test_has_client_id() {
        assert!(!Config::default().has_client_id());
        assert!(Config::new(ApiMode::Sandbox, "id", "secret").has_client_id());
    }

    #[test]
    fn test_auxiliary_properties() {
        let config = Config::new(ApiMode::Sandbox, "id", "secret")
            .with_auxiliary("sandbox_email_address", "dev@example.com");

        let props = config.properties("https://api.sandbox.paypal.com/v1/payments");
        assert_eq!(
            props.get("sandbox_email_address").map(String::as_str),
            Some("dev@example.com")
        );
    }
}
