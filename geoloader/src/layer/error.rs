//! Layer error types.

use thiserror::Error;

use crate::request::TemplateError;

/// Invalid layer configuration. Always fatal at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No `url` option was given.
    #[error("dynamic layer needs a url option")]
    MissingUrl,

    /// The URL template is unusable.
    #[error("invalid url template: {0}")]
    Template(#[from] TemplateError),

    /// A field-name option is empty.
    #[error("option '{0}' must not be empty")]
    EmptyField(&'static str),

    /// An option value cannot be parsed.
    #[error("invalid value '{value}' for option '{key}'")]
    InvalidValue { key: String, value: String },

    /// The configuration file could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Ini(String),

    /// The HTTP transport could not be built from the options.
    #[error("failed to build http transport: {0}")]
    HttpClient(String),
}

/// Errors surfaced to the code driving a layer.
///
/// Transport failures are not part of this type: they are reported through
/// logs and [`super::UpdateOutcome::Failed`] and never abort the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// Construction failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A fetch was requested without a region to fetch.
    #[error("cannot load data: unknown bounds")]
    MissingBounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_error_display() {
        let err = LayerError::from(ConfigError::MissingUrl);
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_template_error_converts() {
        let err: ConfigError = TemplateError::UnknownPlaceholder("zoom".to_string()).into();
        assert_eq!(
            err.to_string(),
            "invalid url template: unknown placeholder '{zoom}' in URL template"
        );
    }
}
