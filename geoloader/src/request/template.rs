//! Fetch URL templates.
//!
//! Templates use `{name}` placeholders, optionally padded with spaces
//! (`{ minlat }`). The four recognised names are the edges of the region
//! being fetched:
//!
//! | Placeholder | Value        |
//! |-------------|--------------|
//! | `{minlat}`  | south edge   |
//! | `{maxlat}`  | north edge   |
//! | `{minlng}`  | west edge    |
//! | `{maxlng}`  | east edge    |

use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::geo::Bounds;

/// Placeholder names a template may use.
pub const PLACEHOLDERS: [&str; 4] = ["minlat", "maxlat", "minlng", "maxlng"];

/// Errors found while parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Template string is empty or whitespace.
    #[error("URL template is empty")]
    Empty,

    /// Template names a placeholder with no value.
    #[error("unknown placeholder '{{{0}}}' in URL template")]
    UnknownPlaceholder(String),
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Same shape the map library's template helper accepts: word characters,
    // spaces and dashes between braces.
    PATTERN.get_or_init(|| Regex::new(r"\{ *([\w -]+?) *\}").unwrap())
}

/// A validated URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    source: String,
}

impl UrlTemplate {
    /// Parse and validate a template.
    ///
    /// Every placeholder must be one of [`PLACEHOLDERS`]. Templates without
    /// placeholders are accepted; they fetch the same URL for every region.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        if source.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        for captures in placeholder_pattern().captures_iter(source) {
            let name = &captures[1];
            if !PLACEHOLDERS.contains(&name) {
                return Err(TemplateError::UnknownPlaceholder(name.to_string()));
            }
        }

        Ok(Self {
            source: source.to_string(),
        })
    }

    /// The template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute the region's edges into the template.
    pub fn render(&self, region: &Bounds) -> String {
        placeholder_pattern()
            .replace_all(&self.source, |captures: &Captures<'_>| {
                match &captures[1] {
                    "minlat" => region.south.to_string(),
                    "maxlat" => region.north.to_string(),
                    "minlng" => region.west.to_string(),
                    "maxlng" => region.east.to_string(),
                    // parse() rejects anything else
                    other => format!("{{{}}}", other),
                }
            })
            .into_owned()
    }
}
