use std::collections::HashSet;

use linksift_logging::{sift_debug, sift_error, sift_info, sift_warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::filter::{compile_filters, passes_filters, FilterConfig, FilterError, MatchMode};
use crate::source::LinkSource;
use crate::tally::Tally;
use crate::types::{ExclusionReason, Link, RawLink};

/// Knobs for one harvest run. Deserializes from camelCase JSON where every
/// key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HarvestOptions {
    pub exclude_external: bool,
    pub exclude_anchors: bool,
    pub exclude_mailto: bool,
    pub exclude_tel: bool,
    pub min_text_length: usize,
    pub deduplicate: bool,
    pub regex_filters: Option<FilterConfig>,
    pub regex_match_mode: MatchMode,
    pub track_excluded: bool,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            exclude_external: false,
            exclude_anchors: true,
            exclude_mailto: true,
            exclude_tel: true,
            min_text_length: 1,
            deduplicate: true,
            regex_filters: None,
            regex_match_mode: MatchMode::All,
            track_excluded: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestStats {
    /// Raw links produced by all sources.
    pub total: usize,
    pub included: usize,
    pub excluded: usize,
    pub exclusion_reasons: Tally,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestResult {
    pub links: Vec<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<HarvestStats>,
}

/// Accumulates exclusions for one run; a no-op when tracking is off.
struct ExclusionLog {
    enabled: bool,
    links: Vec<Link>,
    reasons: Tally,
}

impl ExclusionLog {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            links: Vec::new(),
            reasons: Tally::new(),
        }
    }

    fn record(&mut self, link: Link, reason: ExclusionReason) {
        if !self.enabled {
            return;
        }
        self.reasons.add(reason.as_str());
        self.links.push(link.excluded(reason));
    }
}

/// Runs every source through the filter chain.
///
/// Regex rules are compiled before any source is touched, so a malformed
/// pattern aborts the call. Source failures are logged and skipped.
pub fn harvest<S>(sources: &[S], options: &HarvestOptions) -> Result<HarvestResult, FilterError>
where
    S: LinkSource,
{
    let rules = match &options.regex_filters {
        Some(config) => compile_filters(config)?,
        None => Vec::new(),
    };
    sift_debug!("Compiled {} regex filter rules", rules.len());

    let mut log = ExclusionLog::new(options.track_excluded);
    let mut candidates = Vec::new();
    let mut total = 0;

    for source in sources {
        let name = source.name();
        let raw_links = match source.links() {
            Ok(links) => links,
            Err(err) => {
                sift_error!("Error processing source {}: {}", name, err);
                continue;
            }
        };
        let base_url = source.base_url();
        sift_info!("Processing {} links from: {}", raw_links.len(), name);
        total += raw_links.len();

        let base = match Url::parse(&base_url) {
            Ok(url) => Some(url),
            Err(err) => {
                sift_warn!("Invalid base URL {:?} for {}: {}", base_url, name, err);
                None
            }
        };
        for raw in raw_links {
            match normalize(raw, &name, base.as_ref(), options) {
                Ok(link) => candidates.push(link),
                Err((link, reason)) => log.record(link, reason),
            }
        }
    }

    let mut survivors = Vec::with_capacity(candidates.len());
    for link in candidates {
        if passes_filters(&rules, &link, options.regex_match_mode) {
            survivors.push(link);
        } else {
            log.record(link, ExclusionReason::RegexFilters);
        }
    }

    let links = if options.deduplicate {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(survivors.len());
        for link in survivors {
            if seen.insert((link.name.clone(), link.link.clone())) {
                unique.push(link);
            } else {
                log.record(link, ExclusionReason::Duplicate);
            }
        }
        unique
    } else {
        survivors
    };

    sift_info!("Harvested {} links ({} raw)", links.len(), total);

    if !options.track_excluded {
        return Ok(HarvestResult {
            links,
            excluded: None,
            stats: None,
        });
    }

    let stats = HarvestStats {
        total,
        included: links.len(),
        excluded: log.links.len(),
        exclusion_reasons: log.reasons,
    };
    Ok(HarvestResult {
        links,
        excluded: Some(log.links),
        stats: Some(stats),
    })
}

/// Applies the structural checks to one raw link. First failing check wins.
///
/// `base` is `None` when the source's base URL does not parse; every href
/// that reaches resolution is then invalid.
fn normalize(
    raw: RawLink,
    source: &str,
    base: Option<&Url>,
    options: &HarvestOptions,
) -> Result<Link, (Link, ExclusionReason)> {
    let href = raw.href.unwrap_or_default();
    let text = raw.text.trim();
    let name = if text.is_empty() { href.as_str() } else { text };
    let rejected = Link::new(name, href.as_str(), source);

    if href.is_empty() {
        return Err((rejected, ExclusionReason::MissingHref));
    }
    if options.exclude_anchors && href.starts_with('#') {
        return Err((rejected, ExclusionReason::Anchor));
    }
    if options.exclude_mailto && href.starts_with("mailto:") {
        return Err((rejected, ExclusionReason::Mailto));
    }
    if options.exclude_tel && href.starts_with("tel:") {
        return Err((rejected, ExclusionReason::Tel));
    }
    if rejected.name.chars().count() < options.min_text_length {
        return Err((rejected, ExclusionReason::TextTooShort));
    }

    let Some(base) = base else {
        return Err((rejected, ExclusionReason::InvalidUrl));
    };
    let absolute = match base.join(&href) {
        Ok(url) => url,
        Err(err) => {
            sift_warn!("Invalid URL: {} ({})", href, err);
            return Err((rejected, ExclusionReason::InvalidUrl));
        }
    };

    if options.exclude_external && base.origin() != absolute.origin() {
        return Err((rejected, ExclusionReason::External));
    }

    Ok(Link::new(rejected.name, absolute.as_str(), source))
}
