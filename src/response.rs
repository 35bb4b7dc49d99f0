use crate::error::{RestError, Result};
use crate::transport::RawResponse;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Response is the uniform result of a REST call: either parsed response
/// data or a structured error payload. Exactly one side is populated.
///
/// HTTP error statuses, 400 included, normalize into the `error` side so
/// callers can read the server's diagnostics; they are not hard failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Parsed body of a 2xx response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Error payload of a non-2xx response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl Response {
    /// Classify a raw response by status and content type and produce
    /// the uniform result shape.
    ///
    /// A 2xx body must parse as JSON, as must any error body declared
    /// `application/json`; otherwise the error is synthesized from the
    /// status line, with the raw body string under `developer_message`.
    pub fn from_raw(raw: &RawResponse) -> Result<Response> {
        if raw.is_success() {
            let data = parse_json(raw)?;
            return Ok(Response {
                data: Some(data),
                error: None,
            });
        }

        if raw.is_json() {
            let error = parse_json(raw)?;
            return Ok(Response {
                data: None,
                error: Some(error),
            });
        }

        Ok(Response {
            data: None,
            error: Some(json!({
                "name": raw.status.to_string(),
                "message": raw.reason,
                "developer_message": raw.body,
            })),
        })
    }

    /// Check if the response carries data
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    /// Check if the response carries an error payload
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Error name, when the error payload carries one
    pub fn error_name(&self) -> Option<&str> {
        self.error.as_ref()?.get("name")?.as_str()
    }

    /// Error message, when the error payload carries one
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref()?.get("message")?.as_str()
    }

    /// Apply unmarshals the response data into the provided type.
    /// An error response surfaces as `RestError::Api`.
    pub fn apply<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if self.is_error() {
            return Err(RestError::from_response(self));
        }
        match &self.data {
            Some(data) => serde_json::from_value(data.clone()).map_err(|e| e.into()),
            None => serde_json::from_value(Value::Null).map_err(|e| e.into()),
        }
    }

    /// Get a value from the response data by a slash-separated path.
    /// For example, "payer/payment_method" accesses the "payment_method"
    /// field inside the "payer" object.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let mut current = self.data.as_ref()?;

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get a string value from the response data by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}

fn parse_json(raw: &RawResponse) -> Result<Value> {
    serde_json::from_str(&raw.body).map_err(|e| RestError::MalformedResponse {
        status: raw.status,
        detail: e.to_string(),
    })
}
