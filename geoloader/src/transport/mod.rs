//! Fetch transport abstraction
//!
//! This module provides the trait the layer uses to fetch records for a
//! region, and a `reqwest`-based implementation for JSON endpoints.
//!
//! ```ignore
//! use geoloader::transport::{FetchTransport, ReqwestTransport};
//!
//! let transport = ReqwestTransport::new()?;
//! let response = transport.fetch(&request).await?;
//! ```

mod http;
mod types;

pub use http::{ReqwestTransport, DEFAULT_TIMEOUT_SECS};
pub use types::{parse_response, BoxFuture, FetchResponse, FetchTransport, TransportError};
