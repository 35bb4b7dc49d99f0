use crate::client::{Config, CredentialResolver};
use crate::error::{RestError, Result};
use crate::request::{format_request, RequestPayload};
use crate::response::Response;
use crate::token::{Token, TokenStore};
use crate::transport::{HttpTransport, RawResponse, Transport};
use log::{debug, info};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of one transport exchange, tagged for the retry decision
enum Disposition {
    /// The server answered; the response goes to normalization as-is
    Completed(RawResponse),
    /// HTTP 401 or a transport-layer authorization rejection
    Unauthorized(RestError),
    /// Any other transport failure; never retried
    Failed(RestError),
}

/// Classify a transport outcome. Only the unauthorized class is eligible
/// for the single retry; everything else is terminal.
fn classify(outcome: Result<RawResponse>) -> Disposition {
    match outcome {
        Ok(raw) if raw.status == 401 => Disposition::Unauthorized(RestError::Unauthorized {
            status: raw.status,
            body: raw.body,
        }),
        Ok(raw) => Disposition::Completed(raw),
        Err(err @ RestError::Unauthorized { .. }) => Disposition::Unauthorized(err),
        Err(err) => Disposition::Failed(err),
    }
}

/// Context for REST API calls against one configured service.
///
/// Cloning is cheap and clones share the token cache, so concurrent
/// invocations against the same service reuse one bearer token.
#[derive(Clone)]
pub struct RestContext {
    transport: Arc<dyn Transport>,
    config: Config,
    tokens: Arc<TokenStore>,
    resolver: Arc<dyn CredentialResolver>,
}

impl RestContext {
    /// Create a new REST context with default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new REST context with custom configuration
    pub fn with_config(config: Config) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Create a new REST context with a custom transport implementation
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        let tokens = Arc::new(TokenStore::new(config.clone(), transport.clone()));
        let resolver: Arc<dyn CredentialResolver> = Arc::new(config.clone());
        RestContext {
            transport,
            config,
            tokens,
            resolver,
        }
    }

    /// Replace the credential resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn CredentialResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Drive one logical API call: format the request, send it, and on an
    /// unauthorized outcome invalidate the cached token and replay the
    /// call once with a fresh one.
    ///
    /// # Arguments
    /// * `action` - API action path, joined onto the service endpoint
    /// * `params` - JSON-serializable request parameters
    /// * `headers` - extra headers, overriding any generated ones
    ///
    /// # Returns
    /// The normalized Response; HTTP error statuses (400 included) are
    /// returned as error payloads, not failures
    pub fn invoke<P>(
        &self,
        action: &str,
        params: P,
        headers: &HashMap<String, String>,
    ) -> Result<Response>
    where
        P: Serialize,
    {
        let params = serde_json::to_value(params)?;

        match classify(self.send_attempt(action, &params, headers)?) {
            Disposition::Completed(raw) => Response::from_raw(&raw),
            Disposition::Unauthorized(err) => self.retry_unauthorized(action, &params, headers, err),
            Disposition::Failed(err) => Err(err),
        }
    }

    /// Make a REST API call and unmarshal the response data into the
    /// target type. Error responses surface as `RestError::Api`.
    pub fn apply<T, P>(&self, action: &str, params: P) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        P: Serialize,
    {
        let response = self.invoke(action, params, &HashMap::new())?;
        response.apply()
    }

    /// Current bearer token, fetching one if none is cached
    pub fn token(&self) -> Result<Token> {
        self.tokens.current_token()
    }

    /// Install a caller-supplied access token, bypassing the exchange
    pub fn set_token(&self, access_token: &str, token_type: &str) {
        self.tokens.set_token(access_token, token_type);
    }

    /// The token store backing this context
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Format and send one attempt. Each attempt formats from the original
    /// action and params, so a retry replays the call untouched by the
    /// first attempt.
    fn send_attempt(
        &self,
        action: &str,
        params: &Value,
        headers: &HashMap<String, String>,
    ) -> Result<Result<RawResponse>> {
        let request = format_request(
            &self.tokens,
            self.resolver.as_ref(),
            &self.config.service_endpoint(),
            Method::POST,
            action,
            params,
            headers,
        )?;
        log_http_call(&request);
        Ok(self.transport.send(&request))
    }

    /// One-shot recovery from an unauthorized outcome: invalidate the
    /// cached token and replay the call. The second outcome is terminal.
    fn retry_unauthorized(
        &self,
        action: &str,
        params: &Value,
        headers: &HashMap<String, String>,
        err: RestError,
    ) -> Result<Response> {
        if self.tokens.cached_token().is_none() || !self.config.has_client_id() {
            return Err(err);
        }

        debug!("unauthorized response, invalidating cached token and retrying once");
        self.tokens.invalidate();

        match classify(self.send_attempt(action, params, headers)?) {
            Disposition::Completed(raw) => Response::from_raw(&raw),
            Disposition::Unauthorized(err) | Disposition::Failed(err) => Err(err),
        }
    }
}

impl Default for RestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Surface the caller's request id for correlation; never required
fn log_http_call(request: &RequestPayload) {
    if let Some(request_id) = request.headers.get("PayPal-Request-Id") {
        info!("PayPal-Request-Id: {}", request_id);
    }
}
