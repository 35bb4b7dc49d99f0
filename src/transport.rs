use crate::client::create_rest_client;
use crate::error::Result;
use crate::request::RequestPayload;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

/// Raw HTTP response as seen by the transport, before normalization
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// HTTP reason phrase
    pub reason: String,
    /// Content-Type header, if any
    pub content_type: Option<String>,
    /// Response body
    pub body: String,
}

impl RawResponse {
    /// Check if the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Check if the response declares a JSON body, ignoring media type
    /// parameters such as charset
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                ct.split(';')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .eq_ignore_ascii_case("application/json")
            })
            .unwrap_or(false)
    }
}

/// Transport performs a single HTTP exchange for a formatted request.
///
/// Implementations surface failures through `RestError`: connection-level
/// problems as `Network`, transport timeouts as `Timeout`, and a
/// transport-layer authorization rejection as `Unauthorized`. A plain 401
/// response may be returned as a `RawResponse` instead; callers treat both
/// forms identically.
pub trait Transport: Send + Sync {
    /// Send the request and return the raw response
    fn send(&self, request: &RequestPayload) -> Result<RawResponse>;
}

/// Transport implementation backed by a shared reqwest blocking client
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport with the default HTTP client settings
    pub fn new() -> Self {
        HttpTransport {
            client: create_rest_client(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &RequestPayload) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.uri.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send()?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text()?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            content_type,
            body,
        })
    }
}
