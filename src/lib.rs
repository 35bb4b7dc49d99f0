//! # payrest - REST API client core
//!
//! A Rust client layer for REST services authenticated through the OAuth2
//! client-credentials flow. The crate caches and refreshes the bearer
//! token, formats outgoing JSON requests, normalizes success and error
//! responses into one uniform shape, and transparently retries a call
//! exactly once when the server reports an authorization failure.
//!
//! ## Features
//!
//! - OAuth2 client-credentials token management with expiry tracking and
//!   single-flight refresh
//! - Ordered header overlay: credential-derived headers, bearer
//!   authorization, defaults, caller overrides
//! - Uniform response handling: 2xx JSON, JSON error bodies and non-JSON
//!   error bodies all map to one `Response` shape
//! - Single conditional retry on unauthorized responses, bounded per call
//! - Robust error handling with detailed error types
//!
//! ## Basic Usage
//!
//! ```no_run
//! use payrest::{ApiMode, Config, RestContext};
//! use std::collections::HashMap;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new(ApiMode::Sandbox, "client-id", "client-secret");
//!     let ctx = RestContext::with_config(config);
//!
//!     let response = ctx.invoke(
//!         "/v1/payments/payment",
//!         payrest::json!({ "intent": "sale" }),
//!         &HashMap::new(),
//!     )?;
//!
//!     if let Some(data) = &response.data {
//!         println!("created: {}", data["id"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Token Handling
//!
//! Tokens are fetched on first use and cached until they expire or a
//! call comes back unauthorized. Callers holding a token from elsewhere
//! can install it directly:
//!
//! ```no_run
//! use payrest::{ApiMode, Config, RestContext};
//!
//! let ctx = RestContext::with_config(Config::new(ApiMode::Sandbox, "id", "secret"));
//! ctx.set_token("A21AAF...", "Bearer");
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod rest;
pub mod token;
pub mod transport;

// Re-export main types for convenience
pub use client::{ApiMode, Config, CredentialResolver};
pub use error::{RestError, Result};
pub use request::RequestPayload;
pub use response::Response;
pub use rest::RestContext;
pub use token::{Token, TokenStore};
pub use transport::{HttpTransport, RawResponse, Transport};

// Re-export serde_json for convenience
pub use serde_json::json;
