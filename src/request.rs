use crate::client::CredentialResolver;
use crate::error::Result;
use crate::token::TokenStore;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// Auxiliary credential properties mapped onto their wire header names
const AUX_AUTH_HEADERS: [(&str, &str); 2] = [
    ("sandbox_email_address", "X-PAYPAL-SANDBOX-EMAIL-ADDRESS"),
    ("device_ipaddress", "X-PAYPAL-DEVICE-IPADDRESS"),
];

/// A fully formatted outbound request, ready for the transport layer.
/// Owned by a single in-flight invocation; a retry builds a fresh one
/// from the original action and params.
#[derive(Debug, Clone)]
pub struct RequestPayload {
    /// Full request URI, action path included
    pub uri: Url,
    /// HTTP method
    pub method: Method,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Serialized JSON body
    pub body: String,
}

/// Build an outbound request: join the action onto the service endpoint
/// path, overlay headers in precedence order and serialize the params.
///
/// Header sources, lowest to highest precedence: auxiliary credential
/// headers, the bearer Authorization header, the default Content-Type,
/// caller-supplied headers. Obtaining the bearer header fetches a token
/// when none is cached.
pub(crate) fn format_request(
    tokens: &TokenStore,
    resolver: &dyn CredentialResolver,
    endpoint: &str,
    method: Method,
    action: &str,
    params: &Value,
    extra_headers: &HashMap<String, String>,
) -> Result<RequestPayload> {
    let mut uri = Url::parse(endpoint)?;
    let path = url_join(uri.path(), action);
    uri.set_path(&path);

    let token = tokens.current_token()?;

    let mut headers = HashMap::new();
    let properties = resolver.properties(uri.as_str());
    for (key, header_name) in AUX_AUTH_HEADERS {
        if let Some(value) = properties.get(key) {
            headers.insert(header_name.to_string(), value.clone());
        }
    }
    headers.insert(
        "Authorization".to_string(),
        format!("{} {}", token.token_type, token.access_token),
    );
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    for (name, value) in extra_headers {
        headers.insert(name.clone(), value.clone());
    }

    let body = serde_json::to_string(params)?;

    Ok(RequestPayload {
        uri,
        method,
        headers,
        body,
    })
}

/// Join a path segment onto a base path with exactly one separating slash
fn url_join(base: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiMode, Config};
    use crate::transport::{RawResponse, Transport};
    use serde_json::json;
    use std::sync::Arc;

    struct NoTransport;

    impl Transport for NoTransport {
        fn send(&self, _request: &RequestPayload) -> Result<RawResponse> {
            panic!("no transport call expected");
        }
    }

    fn fixture(config: Config) -> (TokenStore, Config) {
        let store = TokenStore::new(config.clone(), Arc::new(NoTransport));
        store.set_token("cached-token", "Bearer");
        (store, config)
    }

    #[test]
    fn test_url_join() {
        assert_eq!(url_join("/", "v1/payments"), "/v1/payments");
        assert_eq!(url_join("/base/", "/v1/payments"), "/base/v1/payments");
        assert_eq!(url_join("", "v1/payments"), "/v1/payments");
    }

    #[test]
    fn test_format_request_joins_action_path() {
        let (store, config) = fixture(Config::new(ApiMode::Sandbox, "id", "secret"));

        let request = format_request(
            &store,
            &config,
            &config.service_endpoint(),
            Method::POST,
            "/v1/payments/payment",
            &json!({"intent": "sale"}),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(
            request.uri.as_str(),
            "https://api.sandbox.paypal.com/v1/payments/payment"
        );
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, r#"{"intent":"sale"}"#);
    }

    #[test]
    fn test_header_overlay_defaults() {
        let (store, config) = fixture(
            Config::new(ApiMode::Sandbox, "id", "secret")
                .with_auxiliary("sandbox_email_address", "dev@example.com")
                .with_auxiliary("unmapped_key", "ignored"),
        );

        let request = format_request(
            &store,
            &config,
            &config.service_endpoint(),
            Method::POST,
            "v1/payments/payment",
            &json!({}),
            &HashMap::new(),
        )
        .unwrap();

        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer cached-token")
        );
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(
            request
                .headers
                .get("X-PAYPAL-SANDBOX-EMAIL-ADDRESS")
                .map(String::as_str),
            Some("dev@example.com")
        );
        // Only mapped auxiliary keys are emitted
        assert!(!request.headers.values().any(|v| v == "ignored"));
    }

    #[test]
    fn test_caller_headers_take_precedence() {
        let (store, config) = fixture(Config::new(ApiMode::Sandbox, "id", "secret"));

        let mut extra = HashMap::new();
        extra.insert("Content-Type".to_string(), "application/json-patch+json".to_string());
        extra.insert("PayPal-Request-Id".to_string(), "req-42".to_string());

        let request = format_request(
            &store,
            &config,
            &config.service_endpoint(),
            Method::POST,
            "v1/payments/payment",
            &json!({}),
            &extra,
        )
        .unwrap();

        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json-patch+json")
        );
        assert_eq!(
            request.headers.get("PayPal-Request-Id").map(String::as_str),
            Some("req-42")
        );
        // The bearer header survives unless explicitly overridden
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("Bearer cached-token")
        );
    }
}
