use std::fmt;

use serde::{Deserialize, Serialize};

/// A link exactly as a source hands it over, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawLink {
    pub text: String,
    pub href: Option<String>,
}

impl RawLink {
    pub fn new(text: impl Into<String>, href: Option<String>) -> Self {
        Self {
            text: text.into(),
            href,
        }
    }
}

/// An extracted link record.
///
/// `link` is an absolute URL for included links. Excluded links keep the raw
/// href when it never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub link: String,
    pub source: String,
    #[serde(rename = "excludedBy", default, skip_serializing_if = "Option::is_none")]
    pub excluded_by: Option<String>,
}

impl Link {
    pub fn new(name: impl Into<String>, link: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            source: source.into(),
            excluded_by: None,
        }
    }

    pub fn field(&self, field: LinkField) -> &str {
        match field {
            LinkField::Name => &self.name,
            LinkField::Link => &self.link,
            LinkField::Source => &self.source,
        }
    }

    pub(crate) fn excluded(mut self, reason: ExclusionReason) -> Self {
        self.excluded_by = Some(reason.to_string());
        self
    }
}

/// The string fields a filter rule can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkField {
    Name,
    Link,
    Source,
}

impl LinkField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "link" => Some(Self::Link),
            "source" => Some(Self::Source),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Link => "link",
            Self::Source => "source",
        }
    }
}

impl fmt::Display for LinkField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a link was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionReason {
    MissingHref,
    Anchor,
    Mailto,
    Tel,
    TextTooShort,
    InvalidUrl,
    External,
    RegexFilters,
    Duplicate,
}

impl ExclusionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingHref => "missing href",
            Self::Anchor => "anchor link",
            Self::Mailto => "mailto link",
            Self::Tel => "tel link",
            Self::TextTooShort => "text too short",
            Self::InvalidUrl => "invalid url",
            Self::External => "external link",
            Self::RegexFilters => "regex filters",
            Self::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
