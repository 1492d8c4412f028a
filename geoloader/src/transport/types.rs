//! Transport trait and response decoding.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;

use crate::request::FetchRequest;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Elements delivered by one fetch, as raw JSON.
///
/// `None` means the endpoint answered with no data (`null` or an empty
/// body), which is not an error. Elements are validated when merged, so a
/// non-object element is rejected and counted there.
pub type FetchResponse = Option<Vec<Value>>;

/// Errors raised by a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The HTTP client could not be created.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    /// The request failed before a response arrived.
    #[error("Request failed: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body is not a JSON array of records.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Asynchronously fetches the records for a request.
///
/// Each call yields exactly one outcome. Implementations must be usable as
/// `Arc<dyn FetchTransport>` so the layer can share them with spawned tasks.
pub trait FetchTransport: Send + Sync {
    /// Fetch the records for `request`.
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<FetchResponse, TransportError>>;
}

/// Decode a response body.
///
/// Accepts a JSON array, `null` or an empty body. Anything else is a
/// decode error. Array elements are passed through unchecked.
pub fn parse_response(body: &[u8]) -> Result<FetchResponse, TransportError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| TransportError::Decode(e.to_string()))?;

    match value {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(items)),
        other => Err(TransportError::Decode(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
