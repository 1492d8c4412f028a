//! Fetch request construction
//!
//! Turns a region into a fully resolved [`FetchRequest`]: the URL template
//! is rendered with the region's edges, extra query parameters are appended
//! and the opaque payload is attached for the transport.

mod template;

pub use template::{TemplateError, UrlTemplate, PLACEHOLDERS};

use std::collections::BTreeMap;

use serde_json::Value;

use crate::geo::Bounds;

/// A fully resolved request for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Region the request covers.
    pub region: Bounds,
    /// Final URL with placeholders substituted and parameters appended.
    pub url: String,
    /// Payload passed through to the transport unmodified.
    pub data: Option<Value>,
}

/// Builds requests from the layer's URL template, parameters and payload.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    template: UrlTemplate,
    params: BTreeMap<String, String>,
    data: Option<Value>,
}

impl RequestBuilder {
    /// Create a builder.
    pub fn new(
        template: UrlTemplate,
        params: BTreeMap<String, String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            template,
            params,
            data,
        }
    }

    /// The URL template in use.
    pub fn template(&self) -> &UrlTemplate {
        &self.template
    }

    /// Build the request for a region.
    pub fn build(&self, region: &Bounds) -> FetchRequest {
        let mut url = self.template.render(region);

        if !self.params.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.params.iter())
                .finish();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        FetchRequest {
            region: *region,
            url,
            data: self.data.clone(),
        }
    }
}
