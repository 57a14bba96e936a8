//! Link sources backed by a parsed HTML document.

use linksift_core::{LinkSource, RawLink, SourceError};
use linksift_logging::{sift_debug, sift_warn};
use scraper::{Html, Selector};
use url::Url;

pub const DEFAULT_SELECTOR: &str = "a[href]";
pub const DOM_SOURCE_NAME: &str = "DOM";
pub const HTML_SOURCE_NAME: &str = "HTML String";

/// A loaded page: its final URL plus decoded HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    url: String,
    html: String,
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

fn parse_selector(selector: &str) -> Result<Selector, SourceError> {
    Selector::parse(selector).map_err(|err| SourceError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

/// Every element matching `selector`, as (text content, href attribute).
pub fn collect_links(html: &str, selector: &str) -> Result<Vec<RawLink>, SourceError> {
    let compiled = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let links: Vec<RawLink> = document
        .select(&compiled)
        .map(|element| {
            let text = element.text().collect::<String>();
            let href = element.value().attr("href").map(str::to_string);
            RawLink { text, href }
        })
        .collect();
    sift_debug!("Selector {:?} matched {} elements", selector, links.len());
    Ok(links)
}

/// Links of a live page; relative hrefs resolve against the page URL.
#[derive(Debug, Clone)]
pub struct DomSource {
    page: Page,
    selector: String,
}

impl DomSource {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            selector: DEFAULT_SELECTOR.to_string(),
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl LinkSource for DomSource {
    fn links(&self) -> Result<Vec<RawLink>, SourceError> {
        collect_links(self.page.html(), &self.selector)
    }

    fn base_url(&self) -> String {
        self.page.url.clone()
    }

    fn name(&self) -> String {
        DOM_SOURCE_NAME.to_string()
    }
}

/// Links of a standalone HTML string.
#[derive(Debug, Clone)]
pub struct HtmlSource {
    html: String,
    base_url: String,
    selector: String,
}

impl HtmlSource {
    pub fn new(html: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            base_url: base_url.into(),
            selector: DEFAULT_SELECTOR.to_string(),
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }
}

impl LinkSource for HtmlSource {
    fn links(&self) -> Result<Vec<RawLink>, SourceError> {
        collect_links(&self.html, &self.selector)
    }

    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    fn name(&self) -> String {
        HTML_SOURCE_NAME.to_string()
    }
}

/// An `<iframe>` embedded in a page.
///
/// Frame content is only available from `srcdoc` or when attached with
/// [`FrameSource::with_content`]; otherwise the frame yields no links.
#[derive(Debug, Clone)]
pub struct FrameSource {
    src: Option<String>,
    page_url: String,
    content: Option<String>,
    selector: String,
}

impl FrameSource {
    /// `src` is resolved against `page_url`; an unresolvable `src` is dropped.
    pub fn new(src: Option<&str>, page_url: impl Into<String>) -> Self {
        let page_url = page_url.into();
        let src = src
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| resolve(raw, &page_url));
        Self {
            src,
            page_url,
            content: None,
            selector: DEFAULT_SELECTOR.to_string(),
        }
    }

    pub fn with_content(mut self, html: impl Into<String>) -> Self {
        self.content = Some(html.into());
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}

impl LinkSource for FrameSource {
    fn links(&self) -> Result<Vec<RawLink>, SourceError> {
        match &self.content {
            Some(html) => collect_links(html, &self.selector),
            None => {
                sift_warn!("{} (cross-origin?)", SourceError::Inaccessible(self.name()));
                Ok(Vec::new())
            }
        }
    }

    fn base_url(&self) -> String {
        self.src.clone().unwrap_or_else(|| self.page_url.clone())
    }

    fn name(&self) -> String {
        format!("Iframe: {}", self.src.as_deref().unwrap_or(""))
    }
}

fn resolve(reference: &str, base: &str) -> Option<String> {
    let base = Url::parse(base).ok();
    Url::options()
        .base_url(base.as_ref())
        .parse(reference)
        .ok()
        .map(String::from)
}

/// Every `<iframe>` of `page`, with inline `srcdoc` content attached.
pub fn frames_of(page: &Page) -> Vec<FrameSource> {
    let Ok(selector) = Selector::parse("iframe") else {
        return Vec::new();
    };
    let document = Html::parse_document(page.html());
    document
        .select(&selector)
        .map(|element| {
            let frame = FrameSource::new(element.value().attr("src"), page.url());
            match element.value().attr("srcdoc") {
                Some(srcdoc) => frame.with_content(srcdoc),
                None => frame,
            }
        })
        .collect()
}

/// Factory for a live-page source.
pub fn dom(page: Page) -> DomSource {
    DomSource::new(page)
}

/// Factory for an HTML-string source.
pub fn html(html: impl Into<String>, base_url: impl Into<String>) -> HtmlSource {
    HtmlSource::new(html, base_url)
}

/// Factory for a frame source.
pub fn frame(src: Option<&str>, page_url: impl Into<String>) -> FrameSource {
    FrameSource::new(src, page_url)
}
