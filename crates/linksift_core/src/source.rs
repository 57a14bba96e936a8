use serde::Deserialize;
use thiserror::Error;

use crate::types::RawLink;

pub const JSON_SOURCE_NAME: &str = "JSON Array";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot access content of {0}")]
    Inaccessible(String),
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("malformed link records: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A container of links the pipeline can drain.
pub trait LinkSource {
    fn links(&self) -> Result<Vec<RawLink>, SourceError>;
    /// URL that relative hrefs resolve against.
    fn base_url(&self) -> String;
    fn name(&self) -> String;
}

impl<T: LinkSource + ?Sized> LinkSource for &T {
    fn links(&self) -> Result<Vec<RawLink>, SourceError> {
        (**self).links()
    }

    fn base_url(&self) -> String {
        (**self).base_url()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

impl<T: LinkSource + ?Sized> LinkSource for Box<T> {
    fn links(&self) -> Result<Vec<RawLink>, SourceError> {
        (**self).links()
    }

    fn base_url(&self) -> String {
        (**self).base_url()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// A plain record as found in a structured link list.
///
/// Display text is taken from `name`, then `text`; the target from `link`,
/// then `href`, then `url`. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl LinkRecord {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            link: Some(link.into()),
            ..Self::default()
        }
    }

    fn to_raw(&self) -> RawLink {
        let text = first_present([&self.name, &self.text]).unwrap_or_default();
        let href = first_present([&self.link, &self.href, &self.url]);
        RawLink { text, href }
    }
}

fn first_present<const N: usize>(candidates: [&Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .cloned()
}

/// Structured-array source over pre-built link records.
#[derive(Debug, Clone)]
pub struct JsonSource {
    records: Vec<LinkRecord>,
    base_url: String,
}

impl JsonSource {
    pub fn new(records: Vec<LinkRecord>, base_url: impl Into<String>) -> Self {
        Self {
            records,
            base_url: base_url.into(),
        }
    }

    /// Parses a JSON array of link records.
    pub fn from_json_str(json: &str, base_url: impl Into<String>) -> Result<Self, SourceError> {
        let records: Vec<LinkRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records, base_url))
    }

    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }
}

impl LinkSource for JsonSource {
    fn links(&self) -> Result<Vec<RawLink>, SourceError> {
        Ok(self.records.iter().map(LinkRecord::to_raw).collect())
    }

    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    fn name(&self) -> String {
        JSON_SOURCE_NAME.to_string()
    }
}

/// Factory for a structured-array source.
pub fn json(records: Vec<LinkRecord>, base_url: impl Into<String>) -> JsonSource {
    JsonSource::new(records, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_fields_fall_back_in_order() {
        let json = r#"[
            {"text": "Docs", "href": "/docs"},
            {"name": "", "text": "Blog", "link": "", "url": "/blog"},
            {"name": "Only name"}
        ]"#;
        let source = JsonSource::from_json_str(json, "https://example.com/").unwrap();
        let links = source.links().unwrap();

        assert_eq!(links[0], RawLink::new("Docs", Some("/docs".into())));
        assert_eq!(links[1], RawLink::new("Blog", Some("/blog".into())));
        assert_eq!(links[2], RawLink::new("Only name", None));
        assert_eq!(source.name(), "JSON Array");
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = JsonSource::from_json_str("{\"not\": \"an array\"}", "about:blank").unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }
}
