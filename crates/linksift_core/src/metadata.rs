//! Summary statistics over a harvested link set.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::tally::Tally;
use crate::types::Link;

const FILE_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv", "zip", "rar", "mp4", "mp3",
    "jpg", "jpeg", "png", "gif", "svg",
];

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old", "see",
    "two", "way", "who", "boy", "did", "its", "let", "put", "say", "she", "too", "use",
];

/// Words this short never count.
const MIN_WORD_CHARS: usize = 4;

/// Which facets to compute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataOptions {
    pub show_sources: bool,
    pub show_domains: bool,
    pub show_file_types: bool,
    pub show_link_types: bool,
    pub show_name_stats: bool,
    pub show_top_words: bool,
    pub top_n: usize,
    pub top_words: usize,
    /// Host of the page the links were taken from; decides internal vs external.
    pub current_host: Option<String>,
}

impl Default for MetadataOptions {
    fn default() -> Self {
        Self {
            show_sources: true,
            show_domains: true,
            show_file_types: true,
            show_link_types: true,
            show_name_stats: true,
            show_top_words: true,
            top_n: 10,
            top_words: 10,
            current_host: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkTypeCounts {
    pub external: usize,
    pub internal: usize,
    pub anchor: usize,
    pub mailto: usize,
    pub tel: usize,
    pub other: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameStats {
    pub avg_length: usize,
    pub min_length: usize,
    pub max_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadata {
    pub total_links: usize,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Tally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_domains: Option<Tally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_domains: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_types: Option<Tally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_types: Option<LinkTypeCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_stats: Option<NameStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_words: Option<Tally>,
}

pub fn summarize(links: &[Link], options: &MetadataOptions) -> LinkMetadata {
    let mut metadata = LinkMetadata {
        total_links: links.len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        sources: None,
        top_domains: None,
        unique_domains: None,
        file_types: None,
        link_types: None,
        name_stats: None,
        top_words: None,
    };
    if links.is_empty() {
        return metadata;
    }

    if options.show_sources {
        metadata.sources = Some(count_sources(links));
    }
    if options.show_domains {
        let domains = count_domains(links);
        metadata.unique_domains = Some(domains.len());
        metadata.top_domains = Some(domains.top(options.top_n));
    }
    if options.show_file_types {
        metadata.file_types = Some(count_file_types(links));
    }
    if options.show_link_types {
        metadata.link_types = Some(count_link_types(links, options.current_host.as_deref()));
    }
    if options.show_name_stats {
        metadata.name_stats = name_stats(links);
    }
    if options.show_top_words {
        metadata.top_words = Some(count_words(links).top(options.top_words));
    }
    metadata
}

pub fn count_sources(links: &[Link]) -> Tally {
    let mut tally = Tally::new();
    for link in links {
        let source = if link.source.is_empty() {
            "Unknown"
        } else {
            link.source.as_str()
        };
        tally.add(source);
    }
    tally
}

pub fn count_domains(links: &[Link]) -> Tally {
    let mut tally = Tally::new();
    for link in links {
        match Url::parse(&link.link) {
            Ok(url) => tally.add(url.host_str().unwrap_or("")),
            Err(_) => tally.add("invalid-url"),
        }
    }
    tally
}

pub fn file_type(link: &str) -> &'static str {
    let Ok(url) = Url::parse(link) else {
        return "unknown";
    };
    let path = url.path().to_lowercase();
    let extension = path.rsplit('.').next().unwrap_or("");
    FILE_EXTENSIONS
        .iter()
        .find(|known| **known == extension)
        .copied()
        .unwrap_or("webpage")
}

pub fn count_file_types(links: &[Link]) -> Tally {
    let mut tally = Tally::new();
    for link in links {
        tally.add(file_type(&link.link));
    }
    tally
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    External,
    Internal,
    Anchor,
    Mailto,
    Tel,
    Other,
}

/// Classifies one absolute link. Scheme checks come before the fragment
/// check, which comes before the host comparison.
pub fn classify(link: &str, current_host: Option<&str>) -> LinkType {
    let Ok(url) = Url::parse(link) else {
        return LinkType::Other;
    };
    let lower = link.to_lowercase();
    if lower.starts_with("mailto:") {
        LinkType::Mailto
    } else if lower.starts_with("tel:") {
        LinkType::Tel
    } else if lower.contains('#') {
        LinkType::Anchor
    } else if current_host.is_some_and(|host| url.host_str().unwrap_or("") == host) {
        LinkType::Internal
    } else {
        LinkType::External
    }
}

pub fn count_link_types(links: &[Link], current_host: Option<&str>) -> LinkTypeCounts {
    let mut counts = LinkTypeCounts::default();
    for link in links {
        match classify(&link.link, current_host) {
            LinkType::External => counts.external += 1,
            LinkType::Internal => counts.internal += 1,
            LinkType::Anchor => counts.anchor += 1,
            LinkType::Mailto => counts.mailto += 1,
            LinkType::Tel => counts.tel += 1,
            LinkType::Other => counts.other += 1,
        }
    }
    counts
}

pub fn name_stats(links: &[Link]) -> Option<NameStats> {
    let lengths: Vec<usize> = links.iter().map(|l| l.name.chars().count()).collect();
    let min_length = *lengths.iter().min()?;
    let max_length = *lengths.iter().max()?;
    let sum: usize = lengths.iter().sum();
    let avg_length = (sum as f64 / lengths.len() as f64).round() as usize;
    Some(NameStats {
        avg_length,
        min_length,
        max_length,
    })
}

pub fn count_words(links: &[Link]) -> Tally {
    let mut tally = Tally::new();
    for link in links {
        let lowered = link.name.to_lowercase();
        for word in lowered.split_whitespace() {
            if word.chars().count() < MIN_WORD_CHARS || STOPWORDS.contains(&word) {
                continue;
            }
            tally.add(word);
        }
    }
    tally
}
