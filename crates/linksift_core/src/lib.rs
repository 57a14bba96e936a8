//! Linksift core: link model, filter compiler, harvest pipeline and summarizer.
//!
//! Nothing in this crate performs IO. Sources that need a network or an HTML
//! parser live in `linksift_engine`.
mod filter;
mod metadata;
mod pipeline;
mod source;
mod tally;
mod types;

pub use filter::{
    compile_filters, passes_filters, FieldFilter, FilterConfig, FilterError, FilterMode,
    FilterRule, FilterSpec, LegacyPattern, MatchMode, OneOrMany, RuleDef, RuleKind, RuleSpec,
    DEFAULT_FLAGS,
};
pub use metadata::{
    classify, count_domains, count_file_types, count_link_types, count_sources, count_words,
    file_type, name_stats, summarize, LinkMetadata, LinkType, LinkTypeCounts, MetadataOptions,
    NameStats,
};
pub use pipeline::{harvest, HarvestOptions, HarvestResult, HarvestStats};
pub use source::{json, JsonSource, LinkRecord, LinkSource, SourceError, JSON_SOURCE_NAME};
pub use tally::Tally;
pub use types::{ExclusionReason, Link, LinkField, RawLink};
