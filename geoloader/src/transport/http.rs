//! HTTP transport using reqwest.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::types::{parse_response, BoxFuture, FetchResponse, FetchTransport, TransportError};
use crate::request::FetchRequest;

/// Default timeout for fetch requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches JSON record arrays over HTTP GET.
///
/// The request payload is sent the way a GET-with-data is: an object becomes
/// query pairs, a string is appended as a raw query fragment.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a transport with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    async fn get(&self, request: &FetchRequest) -> Result<FetchResponse, TransportError> {
        let url = url_with_data(&request.url, request.data.as_ref());
        debug!(url = %url, region = %request.region, "Fetching records");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Http(format!("Failed to read response: {}", e)))?;

        parse_response(&body)
    }
}

impl FetchTransport for ReqwestTransport {
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<FetchResponse, TransportError>> {
        Box::pin(self.get(request))
    }
}

/// Append the request payload to the URL's query string.
pub(crate) fn url_with_data(url: &str, data: Option<&Value>) -> String {
    let suffix = match data {
        None | Some(Value::Null) => return url.to_string(),
        Some(Value::Object(map)) if map.is_empty() => return url.to_string(),
        Some(Value::Object(map)) => {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in map {
                match value {
                    Value::String(s) => query.append_pair(key, s),
                    Value::Null => query.append_pair(key, ""),
                    other => query.append_pair(key, &other.to_string()),
                };
            }
            query.finish()
        }
        Some(Value::String(raw)) => raw.trim_start_matches(['?', '&']).to_string(),
        Some(other) => {
            warn!(payload = %other, "Ignoring payload that cannot be sent as a query");
            return url.to_string();
        }
    };

    if suffix.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, suffix)
}
