//! Layer configuration.
//!
//! [`LayerOptions`] is the loose, builder-style input; [`LayerConfig`] is the
//! validated form a [`super::DynamicLayer`] is built from. Options can also
//! be read from an INI file:
//!
//! ```ini
//! [layer]
//! url = https://example.com/points?bbox={minlat},{minlng},{maxlat},{maxlng}
//! id_field = uuid
//! icon = pin
//! timeout_secs = 10
//!
//! [params]
//! category = museum
//!
//! [data]
//! lang = en
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ini::Ini;
use serde_json::{Map, Value};

use super::error::ConfigError;
use crate::icon::{Icon, IconPolicy};
use crate::record::{RecordFields, DEFAULT_ID_FIELD, DEFAULT_LAT_FIELD, DEFAULT_LNG_FIELD};
use crate::request::{RequestBuilder, UrlTemplate};
use crate::transport::DEFAULT_TIMEOUT_SECS;

/// INI section holding scalar options.
pub const LAYER_SECTION: &str = "layer";

/// INI section holding extra query parameters.
pub const PARAMS_SECTION: &str = "params";

/// INI section holding the request payload.
pub const DATA_SECTION: &str = "data";

/// Default location of the layer configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("geoloader").join("layer.ini"))
}

/// Construction options for a dynamic layer.
#[derive(Debug, Clone)]
pub struct LayerOptions {
    /// Fetch URL template. Required.
    pub url: Option<String>,
    /// Identifier field name.
    pub id_field: String,
    /// Latitude field name.
    pub lat_field: String,
    /// Longitude field name.
    pub lng_field: String,
    /// Marker icon policy.
    pub icon: IconPolicy,
    /// Extra query parameters appended to every request.
    pub params: BTreeMap<String, String>,
    /// Payload passed through to the transport.
    pub data: Option<Value>,
    /// Transport timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            url: None,
            id_field: DEFAULT_ID_FIELD.to_string(),
            lat_field: DEFAULT_LAT_FIELD.to_string(),
            lng_field: DEFAULT_LNG_FIELD.to_string(),
            icon: IconPolicy::Default,
            params: BTreeMap::new(),
            data: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LayerOptions {
    /// Options with the given URL template and defaults for everything else.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the identifier field name.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Set the coordinate field names.
    pub fn with_coordinate_fields(
        mut self,
        lat_field: impl Into<String>,
        lng_field: impl Into<String>,
    ) -> Self {
        self.lat_field = lat_field.into();
        self.lng_field = lng_field.into();
        self
    }

    /// Set the icon policy.
    pub fn with_icon(mut self, icon: IconPolicy) -> Self {
        self.icon = icon;
        self
    }

    /// Add one extra query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the transport payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the transport timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Read options from an INI file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path)
            .map_err(|e| ConfigError::Ini(format!("{}: {}", path.display(), e)))?;
        Self::from_ini(&ini)
    }

    /// Read options from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Ini(e.to_string()))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut options = Self::default();

        if let Some(layer) = ini.section(Some(LAYER_SECTION)) {
            options.url = layer.get("url").map(str::to_string);
            if let Some(v) = layer.get("id_field") {
                options.id_field = v.to_string();
            }
            if let Some(v) = layer.get("lat_field") {
                options.lat_field = v.to_string();
            }
            if let Some(v) = layer.get("lng_field") {
                options.lng_field = v.to_string();
            }
            if let Some(v) = layer.get("icon") {
                options.icon = IconPolicy::Fixed(Icon::named(v));
            }
            if let Some(v) = layer.get("timeout_secs") {
                options.timeout_secs = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "timeout_secs".to_string(),
                    value: v.to_string(),
                })?;
            }
        }

        if let Some(params) = ini.section(Some(PARAMS_SECTION)) {
            for (key, value) in params.iter() {
                options.params.insert(key.to_string(), value.to_string());
            }
        }

        if let Some(data) = ini.section(Some(DATA_SECTION)) {
            let payload: Map<String, Value> = data
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            if !payload.is_empty() {
                options.data = Some(Value::Object(payload));
            }
        }

        Ok(options)
    }
}

/// Validated layer configuration.
#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// Parsed URL template.
    pub template: UrlTemplate,
    /// Field names.
    pub fields: RecordFields,
    /// Marker icon policy.
    pub icon: IconPolicy,
    /// Extra query parameters.
    pub params: BTreeMap<String, String>,
    /// Transport payload.
    pub data: Option<Value>,
    /// Transport timeout in seconds.
    pub timeout_secs: u64,
}

impl LayerConfig {
    /// Validate options.
    ///
    /// Fails if the URL is missing or empty, names an unknown placeholder, or
    /// if any field name is empty.
    pub fn from_options(options: LayerOptions) -> Result<Self, ConfigError> {
        let url = options.url.ok_or(ConfigError::MissingUrl)?;
        if url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let template = UrlTemplate::parse(&url)?;

        for (name, value) in [
            ("id_field", &options.id_field),
            ("lat_field", &options.lat_field),
            ("lng_field", &options.lng_field),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField(name));
            }
        }

        Ok(Self {
            template,
            fields: RecordFields {
                id: options.id_field,
                lat: options.lat_field,
                lng: options.lng_field,
            },
            icon: options.icon,
            params: options.params,
            data: options.data,
            timeout_secs: options.timeout_secs,
        })
    }

    /// Request builder for this configuration.
    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(self.template.clone(), self.params.clone(), self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "http://x/?bbox={minlat},{minlng},{maxlat},{maxlng}";

    #[test]
    fn test_defaults() {
        let config = LayerConfig::from_options(LayerOptions::new(URL)).unwrap();
        assert_eq!(config.fields, RecordFields::default());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.params.is_empty());
        assert!(config.data.is_none());
    }

    #[test]
    fn test_missing_url_is_fatal() {
        let err = LayerConfig::from_options(LayerOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingUrl);

        let err = LayerConfig::from_options(LayerOptions::new("")).unwrap_err();
        assert_eq!(err, ConfigError::MissingUrl);
    }

    #[test]
    fn test_unknown_placeholder_is_fatal() {
        let err = LayerConfig::from_options(LayerOptions::new("http://x/{z}/{x}/{y}")).unwrap_err();
        assert!(matches!(err, ConfigError::Template(_)));
    }

    #[test]
    fn test_empty_field_name_is_fatal() {
        let err =
            LayerConfig::from_options(LayerOptions::new(URL).with_id_field(" ")).unwrap_err();
        assert_eq!(err, ConfigError::EmptyField("id_field"));
    }

    #[test]
    fn test_builder_methods() {
        let options = LayerOptions::new(URL)
            .with_id_field("uuid")
            .with_coordinate_fields("y", "x")
            .with_param("type", "cafe")
            .with_data(json!({"lang": "en"}))
            .with_timeout_secs(5);
        let config = LayerConfig::from_options(options).unwrap();

        assert_eq!(config.fields.id, "uuid");
        assert_eq!(config.fields.lat, "y");
        assert_eq!(config.fields.lng, "x");
        assert_eq!(config.params.get("type").map(String::as_str), Some("cafe"));
        assert_eq!(config.data, Some(json!({"lang": "en"})));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_from_ini_str() {
        let text = "\
[layer]
url = http://x/?b={minlat},{minlng},{maxlat},{maxlng}
id_field = uuid
icon = pin
timeout_secs = 12

[params]
category = museum

[data]
lang = en
";
        let options = LayerOptions::from_ini_str(text).unwrap();
        assert_eq!(
            options.url.as_deref(),
            Some("http://x/?b={minlat},{minlng},{maxlat},{maxlng}")
        );
        assert_eq!(options.id_field, "uuid");
        assert_eq!(options.lat_field, "lat");
        assert_eq!(options.timeout_secs, 12);
        assert_eq!(
            options.params.get("category").map(String::as_str),
            Some("museum")
        );
        assert_eq!(options.data, Some(json!({"lang": "en"})));
        assert!(matches!(options.icon, IconPolicy::Fixed(ref i) if i.name() == "pin"));
    }

    #[test]
    fn test_from_ini_without_url_fails_validation() {
        let options = LayerOptions::from_ini_str("[params]\na = 1\n").unwrap();
        assert_eq!(
            LayerConfig::from_options(options).unwrap_err(),
            ConfigError::MissingUrl
        );
    }

    #[test]
    fn test_from_ini_invalid_timeout() {
        let err = LayerOptions::from_ini_str("[layer]\nurl = http://x/\ntimeout_secs = soon\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer.ini");
        std::fs::write(&path, format!("[layer]\nurl = {}\n", URL)).unwrap();

        let options = LayerOptions::from_file(&path).unwrap();
        assert_eq!(options.url.as_deref(), Some(URL));
    }

    #[test]
    fn test_from_missing_file() {
        let err = LayerOptions::from_file(Path::new("/nonexistent/geoloader/layer.ini"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Ini(_)));
    }

    #[test]
    fn test_default_config_path_ends_with_file_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("geoloader/layer.ini"));
        }
    }
}
