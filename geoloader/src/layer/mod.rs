//! The dynamic point layer.
//!
//! [`DynamicLayer`] owns the loaded region, the record store and the marker
//! set, and exposes the update cycle in three steps so a host can run the
//! fetch wherever it likes:
//!
//! 1. [`DynamicLayer::on_viewport_change`] plans a [`FetchRequest`]
//! 2. [`execute`] runs it against a [`FetchTransport`]
//! 3. [`DynamicLayer::complete`] applies the result
//!
//! [`DynamicLayer::update`] chains the three for single-owner use, and
//! [`AttachedLayer`] wires a layer to a [`MapHost`](crate::host::MapHost)
//! event stream.
//!
//! [`FetchRequest`]: crate::request::FetchRequest
//! [`FetchTransport`]: crate::transport::FetchTransport

mod config;
mod driver;
mod dynamic;
mod error;

pub use config::{
    default_config_path, LayerConfig, LayerOptions, DATA_SECTION, LAYER_SECTION, PARAMS_SECTION,
};
pub use driver::AttachedLayer;
pub use dynamic::{execute, DynamicLayer, FetchCompletion, UpdateOutcome};
pub use error::{ConfigError, LayerError};
