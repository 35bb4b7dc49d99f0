use crate::client::Config;
use crate::error::{RestError, Result};
use crate::request::RequestPayload;
use crate::transport::Transport;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

/// Body of the OAuth2 client-credentials grant request
pub const TOKEN_REQUEST_PARAMS: &str = "grant_type=client_credentials";

/// Path forced onto token endpoints that carry no path of their own
const OAUTH2_TOKEN_PATH: &str = "/v1/oauth2/token";

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Token represents a bearer token obtained through the OAuth2
/// client-credentials grant, together with its expiry bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Access token for API requests
    pub access_token: String,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Token lifetime in seconds; absent means the token never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Time the token was issued; set locally, never part of the wire format
    #[serde(skip)]
    pub issued_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Create a new non-expiring Token issued now
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Token {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_in: None,
            issued_at: Some(Utc::now()),
        }
    }

    /// Check whether the token is still valid at this moment
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Check whether the token is valid at the given instant.
    /// A token with no recorded issue time is never valid; a token with
    /// no expiry is valid until explicitly invalidated.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let issued_at = match self.issued_at {
            Some(issued_at) => issued_at,
            None => return false,
        };
        match self.expires_in {
            Some(expires_in) => (now - issued_at).num_seconds() <= expires_in,
            None => true,
        }
    }
}

/// TokenStore owns the cached bearer token and the client-credentials
/// exchange that produces a fresh one.
///
/// The cache lock is held across the fetch, so concurrent callers racing
/// on an empty cache share a single in-flight exchange.
pub struct TokenStore {
    config: Config,
    transport: Arc<dyn Transport>,
    cached: Mutex<Option<Token>>,
}

impl TokenStore {
    /// Create a new TokenStore with an empty cache
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        TokenStore {
            config,
            transport,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached token if still valid, otherwise perform a
    /// blocking client-credentials exchange and cache the result
    pub fn current_token(&self) -> Result<Token> {
        let mut cached = self.cached.lock().unwrap();
        if let Some(token) = cached.as_ref() {
            if token.is_valid() {
                return Ok(token.clone());
            }
        }

        let token = self.fetch_token()?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Discard the cached token unconditionally; idempotent
    pub fn invalidate(&self) {
        *self.cached.lock().unwrap() = None;
    }

    /// Install a caller-supplied access token, bypassing the exchange.
    /// The token is treated as non-expiring until explicitly invalidated.
    pub fn set_token(&self, access_token: &str, token_type: &str) {
        self.replace_token(Token::new(access_token, token_type));
    }

    /// Install a full token, replacing whatever is cached
    pub fn replace_token(&self, token: Token) {
        *self.cached.lock().unwrap() = Some(token);
    }

    /// Snapshot of the cached token, valid or not, without fetching
    pub fn cached_token(&self) -> Option<Token> {
        self.cached.lock().unwrap().clone()
    }

    /// Token endpoint URI; the oauth2 path is forced only when the
    /// configured endpoint carries no path of its own
    pub fn token_uri(&self) -> Result<Url> {
        let mut uri = Url::parse(&self.config.token_endpoint())?;
        if uri.path().is_empty() || uri.path() == "/" {
            uri.set_path(OAUTH2_TOKEN_PATH);
        }
        Ok(uri)
    }

    /// Exchange the client id and secret for a fresh bearer token
    fn fetch_token(&self) -> Result<Token> {
        let uri = self.token_uri()?;
        debug!("requesting access token from {}", uri);

        let basic_auth = STANDARD.encode(format!(
            "{}:{}",
            self.config.client_id, self.config.client_secret
        ));
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Authorization".to_string(), format!("Basic {}", basic_auth));

        let request = RequestPayload {
            uri,
            method: Method::POST,
            headers,
            body: TOKEN_REQUEST_PARAMS.to_string(),
        };

        let response = self.transport.send(&request).map_err(|e| {
            RestError::Authentication {
                message: format!("token request failed: {}", e),
            }
        })?;

        if !response.is_success() {
            return Err(RestError::Authentication {
                message: format!("token endpoint returned HTTP {}", response.status),
            });
        }

        let mut token: Token =
            serde_json::from_str(&response.body).map_err(|e| RestError::Authentication {
                message: format!("unparseable token response: {}", e),
            })?;
        token.issued_at = Some(Utc::now());

        debug!("access token obtained, type {}", token.token_type);
        Ok(token)
    }
}
