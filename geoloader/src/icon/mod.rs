//! Marker icons and the policy choosing them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Name of the icon used when no policy is configured.
pub const DEFAULT_ICON_NAME: &str = "default";

/// Opaque icon value handed to the render surface.
///
/// The layer never interprets it; the host maps the name to whatever its
/// renderer needs (sprite, URL, glyph).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Icon {
    name: String,
}

impl Icon {
    /// Create an icon with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Icon name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true for the host's default icon.
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_ICON_NAME
    }
}

impl Default for Icon {
    fn default() -> Self {
        Self::named(DEFAULT_ICON_NAME)
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Per-record icon function.
pub type IconFn = Arc<dyn Fn(&Record) -> Icon + Send + Sync>;

/// How markers get their icon.
#[derive(Clone, Default)]
pub enum IconPolicy {
    /// Use the host's default icon.
    #[default]
    Default,
    /// Same icon for every marker.
    Fixed(Icon),
    /// Icon computed from each record.
    PerRecord(IconFn),
}

impl IconPolicy {
    /// Build a per-record policy from a closure.
    pub fn per_record<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Icon + Send + Sync + 'static,
    {
        IconPolicy::PerRecord(Arc::new(f))
    }

    /// Resolve the icon for a record.
    pub fn icon_for(&self, record: &Record) -> Icon {
        match self {
            IconPolicy::Default => Icon::default(),
            IconPolicy::Fixed(icon) => icon.clone(),
            IconPolicy::PerRecord(f) => f(record),
        }
    }
}

impl fmt::Debug for IconPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconPolicy::Default => f.write_str("Default"),
            IconPolicy::Fixed(icon) => f.debug_tuple("Fixed").field(icon).finish(),
            IconPolicy::PerRecord(_) => f.write_str("PerRecord(<fn>)"),
        }
    }
}
